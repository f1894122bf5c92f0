use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quotation {
    pub offset: i32,
    pub length: i32,
    pub verb: String,
    pub text: String,
}
