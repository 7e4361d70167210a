// Resume extraction: page 1 → PNG → vision model → intermediate store.

pub mod extractor;
pub mod render;
