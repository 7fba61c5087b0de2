mod bound_method;
pub use bound_method::*;

mod caller_interface;
pub use caller_interface::*;
