//! Output of reconciled panel sites.
//!
//! - [`header`]: builds the output header from the two input headers
//! - [`writer`]: renders and writes one VCF line per panel site
//!
//! ## Record layout
//!
//! ```text
//! #CHROM  POS  ID     REF  ALT  QUAL   FILTER  INFO  FORMAT    SAMPLE
//! chr1    100  rs100  A    G    87.46  .       .     GT:GC:PL  1/1:var:400,30,0
//! ```
//!
//! With the tag in `INFO` the same site is written as
//! `... . VM=var GT:PL 1/1:400,30,0`.

pub mod header;
pub mod writer;
