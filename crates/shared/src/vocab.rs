//! Predicate and class IRIs used by the PASS pod layout.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

pub const LDP_CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
pub const LDP_BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";

pub const PIM_STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";

pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
pub const VCARD_FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
pub const VCARD_ORGANIZATION_NAME: &str = "http://www.w3.org/2006/vcard/ns#organization-name";

pub mod schema {
    pub const PERSON: &str = "http://schema.org/Person";
    pub const GIVEN_NAME: &str = "http://schema.org/givenName";
    pub const FAMILY_NAME: &str = "http://schema.org/familyName";
    pub const ALTERNATE_NAME: &str = "http://schema.org/alternateName";
    pub const IDENTIFIER: &str = "http://schema.org/identifier";
    pub const URL: &str = "http://schema.org/URL";
    pub const NAME: &str = "http://schema.org/name";
    pub const DESCRIPTION: &str = "http://schema.org/description";
    pub const END_DATE: &str = "http://schema.org/endDate";
    pub const DATE_MODIFIED: &str = "http://schema.org/dateModified";
    pub const UPLOAD_DATE: &str = "https://schema.org/uploadDate";
}

pub const CHECKSUM: &str = "checksum";

pub mod acl {
    pub const AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
    pub const AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
    pub const ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
    pub const DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";
    pub const MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
    pub const READ: &str = "http://www.w3.org/ns/auth/acl#Read";
    pub const WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
    pub const APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
    pub const CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";
}
