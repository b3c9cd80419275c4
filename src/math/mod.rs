pub mod calculus;
pub mod descent;
pub mod functions;
pub mod stats;
