//! Database schema and migrations.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded. The schema_version table tracks which ones have run.

/// Database migrations, in order.
pub const MIGRATIONS: &[&str] = &[
    // v1: Folders and documents
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    icon        TEXT NOT NULL DEFAULT 'folder',
    created_at  TEXT NOT NULL
);

CREATE TABLE documents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    file_name   TEXT NOT NULL,           -- original upload name, used for downloads
    file_path   TEXT NOT NULL UNIQUE,    -- storage path chosen by the server
    file_size   INTEGER NOT NULL,
    file_type   TEXT NOT NULL,
    category    TEXT,
    folder_id   INTEGER REFERENCES folders(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_documents_category ON documents(category);
CREATE INDEX idx_documents_folder_id ON documents(folder_id);
CREATE INDEX idx_documents_created_at ON documents(created_at);
"#,
    // v2: News articles
    r#"
CREATE TABLE news (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    image_url   TEXT,                    -- '/uploads/<name>' for local images, otherwise external
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_news_created_at ON news(created_at);
"#,
    // v3: Contact form submissions
    r#"
CREATE TABLE contacts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    phone       TEXT,
    message     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
"#,
];
