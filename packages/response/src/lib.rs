pub mod error;
pub mod response;

pub use error::{ResponseError, ResponseResult};
pub use response::{InputDescriptor, JsonResponse};
