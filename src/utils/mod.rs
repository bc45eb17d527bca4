pub mod dates;
pub mod pagination;

pub use pagination::{Page, paginate};
