// =============================================================================
// DATASET CONSTANTS
// =============================================================================

/// File names of the per-entity JSON documents (local file mode) and the
/// object keys of the corresponding blobs (blob mode).
pub const CATEGORIES_DOCUMENT: &str = "categories.json";
pub const TUTORIALS_DOCUMENT: &str = "tutorials.json";
pub const ADMIN_USERS_DOCUMENT: &str = "admin.json";

/// Sentinel category every tutorial falls back to when none is assigned.
pub const DEFAULT_CATEGORY_ID: &str = "category-default";

// =============================================================================
// ICONS
// =============================================================================

/// Icon names the reader UI can render. Anything else falls back to
/// [`DEFAULT_ICON`] at resolution time; unknown names are never an error.
pub const SUPPORTED_ICONS: &[&str] = &[
    "BookOpen",
    "Folder",
    "FileText",
    "Video",
    "Image",
    "Settings",
    "Download",
    "Upload",
    "Database",
    "Users",
    "ShoppingCart",
    "Package",
    "Clipboard",
    "Archive",
    "Calendar",
    "Clock",
    "Star",
    "Heart",
    "CheckCircle",
    "AlertCircle",
    "Info",
    "HelpCircle",
    "Search",
    "Filter",
];

pub const DEFAULT_ICON: &str = "Folder";

// =============================================================================
// SEARCH
// =============================================================================

/// Queries shorter than this short-circuit to an empty result.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Characters kept before a match in a search excerpt.
pub const EXCERPT_BEFORE: usize = 40;

/// Characters kept after a match in a search excerpt.
pub const EXCERPT_AFTER: usize = 60;

/// Fallback excerpt length when the query is not found in stripped content.
pub const EXCERPT_FALLBACK_LEN: usize = 100;

/// Separator between ancestor names in a category breadcrumb.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

// =============================================================================
// ADMIN USERS
// =============================================================================

pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt work factor, matching the hashes already present in legacy datasets.
pub const BCRYPT_COST: u32 = 10;
