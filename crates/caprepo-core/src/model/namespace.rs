//! Well-known namespaces, attribute and directive names

/// Identity namespace: name, version and type of a resource
pub const IDENTITY_NAMESPACE: &str = "osgi.identity";
/// Identity attribute holding the symbolic name
pub const IDENTITY_NAME_ATTRIBUTE: &str = IDENTITY_NAMESPACE;
pub const VERSION_ATTRIBUTE: &str = "version";
pub const TYPE_ATTRIBUTE: &str = "type";

pub const TYPE_BUNDLE: &str = "osgi.bundle";
pub const TYPE_FRAGMENT: &str = "osgi.fragment";
pub const TYPE_UNKNOWN: &str = "unknown";

/// Content namespace: where the bytes of a resource can be retrieved
pub const CONTENT_NAMESPACE: &str = "osgi.content";
pub const CONTENT_URL_ATTRIBUTE: &str = "url";
pub const CONTENT_SIZE_ATTRIBUTE: &str = "size";
pub const CONTENT_MIME_ATTRIBUTE: &str = "mime";
/// Content attribute holding the digest of the bytes
pub const CONTENT_DIGEST_ATTRIBUTE: &str = CONTENT_NAMESPACE;

/// Maven identity namespace: artifact coordinates
pub const MAVEN_IDENTITY_NAMESPACE: &str = "maven.identity";
pub const MAVEN_IDENTITY_ATTRIBUTE: &str = MAVEN_IDENTITY_NAMESPACE;

pub const FILTER_DIRECTIVE: &str = "filter";
pub const RESOLUTION_DIRECTIVE: &str = "resolution";
pub const RESOLUTION_MANDATORY: &str = "mandatory";
pub const RESOLUTION_OPTIONAL: &str = "optional";
