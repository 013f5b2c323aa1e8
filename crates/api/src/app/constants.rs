//! Literal status codes and messages carried in response envelopes.

pub const STATUS_201: &str = "201";
pub const MESSAGE_201: &str = "Account created successfully";
pub const STATUS_200: &str = "200";
pub const MESSAGE_200: &str = "Request processed successfully";
pub const STATUS_417: &str = "417";
pub const MESSAGE_417_UPDATE: &str = "Update operation failed. Please try again or contact Dev team";
pub const MESSAGE_417_DELETE: &str = "Delete operation failed. Please try again or contact Dev team";
pub const STATUS_500: &str = "500";
pub const MESSAGE_500: &str = "An error occurred. Please try again or contact Dev team";
