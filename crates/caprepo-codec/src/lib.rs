//! caprepo codec - XML reader and writer for repository documents
//!
//! A repository document has one `<repository>` element carrying the
//! repository attributes, containing zero or more `<resource>` elements:
//!
//! ```xml
//! <repository xmlns="http://www.osgi.org/xmlns/repository/v1.0.0" name="test" increment="1">
//!   <resource>
//!     <capability namespace="osgi.identity">
//!       <attribute name="osgi.identity" value="org.example.core"/>
//!       <attribute name="version" value="1.2.8" type="Version"/>
//!     </capability>
//!     <requirement namespace="osgi.identity">
//!       <directive name="filter" value="(osgi.identity=org.example.api)"/>
//!     </requirement>
//!   </resource>
//! </repository>
//! ```
//!
//! Attributes without a `type` are strings. A value containing a comma after
//! its first character is a list.

pub mod error;
pub mod reader;
pub mod wire;
pub mod writer;

pub use error::{CodecError, Result};
pub use reader::{read_all, RepositoryReader};
pub use writer::{write_all, RepositoryWriter};
