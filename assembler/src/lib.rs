// rgc — Render Graph Constructor
//
// Library root. Leaf-first: catalog and reference resolution, then the
// builder and validator, then variant-driven assembly and the emitters.

pub mod assemble;
pub mod blackbody;
pub mod builder;
pub mod catalog;
pub mod diag;
pub mod dot;
pub mod error;
pub mod graph;
pub mod host;
pub mod passes;
pub mod reference;
pub mod validate;
pub mod variant;
