//! header — заголовок словаря: карта атрибутов, чтение/запись полей, политика.
//!
//! Разделение по подмодулям:
//! - attrs.rs  — AttrKey (реестр ключей) и AttributeMap (типизированные get/set).
//! - rw.rs     — magic/version/flags/size и блок атрибутов поверх ExtendableBuffer.
//! - policy.rs — HeaderPolicy: типизированные читатели, fill-in и двухпроходная запись.

pub mod attrs;
pub mod policy;
pub mod rw;

pub use attrs::{AttrKey, AttributeMap};
pub use policy::HeaderPolicy;
pub use rw::{fetch_all_header_attributes, read_header_prefix, HeaderPrefix};
