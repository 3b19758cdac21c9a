//! Structured header elements.
//!
//! Many header values are comma-separated lists of elements, each a token followed by
//! `;`-separated parameters:
//!
//! ```text
//! Accept: text/html;level=1;q=0.7, text/*;q=0.3
//! ```
//!
//! - [`HeaderElement`]: one `token;key=val` element, parsed permissively
//! - [`AcceptElement`]: an element of an `Accept*`/`TE` header, ordered by its quality value
//! - [`header_elements`]: splits a whole header value and returns its elements sorted, most
//!   preferred first
//!
//! Only the quality value of an `Accept*` element can fail to parse; everything else degrades to a
//! best-effort interpretation.

mod accept_element;
mod header_element;
mod list;

pub use accept_element::AcceptElement;
pub use accept_element::Preference;
pub use accept_element::compare_preference;

pub use header_element::HeaderElement;
pub use header_element::ParamValue;
pub use header_element::Params;
pub use header_element::compare_by_value;

pub use list::accept_elements;
pub use list::header_elements;
pub use list::is_quality_header;
pub use list::plain_elements;
pub use list::split_header_value;
