pub mod resource;

pub use resource::get as resource_get;
pub use resource::list as resource_list;
