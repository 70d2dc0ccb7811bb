pub use crate::print_output;
pub use crate::util::output::{print_json, respond};
