pub mod attachment;
pub mod request;

pub use attachment::{
    AttachmentAttributes, AttachmentBody, AttachmentKind, PersistableAttachment, Reference,
    UserProfile,
};
pub use request::{AlertReference, AlertRule, AttachmentRequest, NewAttachment, OneOrMany, UserComment};
