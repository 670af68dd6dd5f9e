//! Namespaces and vocabulary shared across the validator.

// ============================================================================
// Namespaces
// ============================================================================

/// METS namespace
pub const XMLNS_METS: &str = "http://www.loc.gov/METS/";

/// XLink namespace, used for `xlink:href`, `xlink:from` and `xlink:to`
pub const XMLNS_XLINK: &str = "http://www.w3.org/1999/xlink";

// ============================================================================
// Struct map types
// ============================================================================

/// `TYPE` of the struct map describing the page sequence
pub const STRUCT_MAP_PHYSICAL: &str = "PHYSICAL";

/// `TYPE` of the struct map describing the table of contents
pub const STRUCT_MAP_LOGICAL: &str = "LOGICAL";

/// `TYPE` of the top division of the physical struct map
pub const DIV_PHYS_SEQUENCE: &str = "physSequence";

/// `TYPE` of each division below the physical sequence
pub const DIV_PAGE: &str = "page";

// ============================================================================
// File groups
// ============================================================================

/// `USE` of the file group holding the page images
pub const USE_MASTER: &str = "MASTER";

/// `USE` of the file group holding ALTO page annotations
pub const USE_ALTO: &str = "ALTO";

/// Directory every ALTO file location must live under
pub const ALTO_DIRECTORY: &str = "alto/";

/// Required `BETYPE` of an `area` inside a logical file pointer
pub const BETYPE_IDREF: &str = "IDREF";
