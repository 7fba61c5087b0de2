mod generate_call_id;
mod now;

pub use generate_call_id::generate_call_id;
pub use now::now;
