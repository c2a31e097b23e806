//! OpenAPI description of the HTTP API.

use utoipa::OpenApi;

use super::dto::{
    BatchUploadResponse, ContactRequest, ContactResponse, CreateFolderRequest, DocumentResponse,
    FolderResponse, LoginRequest, NewsResponse, SessionResponse, UpdateDocumentRequest,
    UploadErrorResponse,
};
use super::handlers;

/// OpenAPI document for the site API.
#[derive(OpenApi)]
#[openapi(
    info(title = "School site API"),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::contact::submit_contact,
        handlers::contact::list_contacts,
        handlers::document::list_documents,
        handlers::document::get_document,
        handlers::document::download_document,
        handlers::document::upload_documents,
        handlers::document::update_document,
        handlers::document::delete_document,
        handlers::folder::list_folders,
        handlers::folder::list_folder_documents,
        handlers::folder::create_folder,
        handlers::folder::delete_folder,
        handlers::news::list_news,
        handlers::news::get_news,
        handlers::news::create_news,
        handlers::news::update_news,
        handlers::news::delete_news,
    ),
    components(schemas(
        LoginRequest,
        SessionResponse,
        ContactRequest,
        ContactResponse,
        CreateFolderRequest,
        FolderResponse,
        UpdateDocumentRequest,
        DocumentResponse,
        BatchUploadResponse,
        UploadErrorResponse,
        NewsResponse,
    )),
    tags(
        (name = "auth", description = "Admin session"),
        (name = "documents", description = "Downloadable documents"),
        (name = "folders", description = "Document folders"),
        (name = "news", description = "News articles"),
        (name = "contact", description = "Contact form")
    )
)]
pub struct ApiDoc;
