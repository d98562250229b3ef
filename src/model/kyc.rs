//! KYC documents and their page-upload flow.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{params, Ident};
use crate::model::user::Consumer;

/// Document kinds accepted by the service.
pub mod document_type {
    pub const IDENTITY_PROOF: &str = "IDENTITY_PROOF";
    pub const REGISTRATION_PROOF: &str = "REGISTRATION_PROOF";
    pub const ARTICLES_OF_ASSOCIATION: &str = "ARTICLES_OF_ASSOCIATION";
    pub const SHAREHOLDER_DECLARATION: &str = "SHAREHOLDER_DECLARATION";
    pub const ADDRESS_PROOF: &str = "ADDRESS_PROOF";
}

/// Review states a document moves through.
pub mod document_status {
    pub const CREATED: &str = "CREATED";
    pub const VALIDATION_ASKED: &str = "VALIDATION_ASKED";
    pub const VALIDATED: &str = "VALIDATED";
    pub const REFUSED: &str = "REFUSED";
}

/// An identity document attached to a user.
///
/// Documents are created server-side right away; pages are then uploaded
/// one by one, and the whole document is submitted for review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Document {
    #[serde(flatten)]
    pub ident: Ident,
    pub user_id: String,
    pub status: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub refused_reason_message: String,
    pub refused_reason_type: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

impl Document {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Uploads one page of the document. The bytes travel base64-encoded.
    pub async fn create_page(&self, file: &[u8]) -> Result<()> {
        let mut payload = params(&[("Id", self.ident.id.as_str()), ("UserId", self.user_id.as_str())]);
        payload.insert("File".into(), STANDARD.encode(file).into());
        self.service()?.dispatch(Action::CreateDocumentPage, Some(payload)).await?;
        Ok(())
    }

    /// Moves the document to another review status, usually
    /// `VALIDATION_ASKED` once every page is uploaded.
    pub async fn submit(&mut self, status: &str, tag: &str) -> Result<()> {
        let mut payload = params(&[
            ("Id", self.ident.id.as_str()),
            ("UserId", self.user_id.as_str()),
            ("Status", status),
        ]);
        if !tag.is_empty() {
            payload.insert("Tag".into(), tag.into());
        }
        let service = self.service()?.clone();
        let fresh: Document = service.dispatch_into(Action::SubmitDocument, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        Ok(())
    }
}

impl Mango {
    /// Creates a document for `user` server-side and returns it ready for
    /// page uploads.
    pub async fn new_document(&self, user: &dyn Consumer, kind: &str, tag: &str) -> Result<Document> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let mut payload = params(&[("UserId", user.consumer_id()), ("Type", kind)]);
        if !tag.is_empty() {
            payload.insert("Tag".into(), tag.into());
        }
        let mut document: Document = self.dispatch_into(Action::CreateDocument, Some(payload)).await?;
        document.service = Some(self.clone());
        Ok(document)
    }

    /// Fetches a document by id.
    pub async fn document(&self, id: &str) -> Result<Document> {
        let mut document: Document = self
            .dispatch_into(Action::FetchDocument, Some(params(&[("Id", id)])))
            .await?;
        document.service = Some(self.clone());
        Ok(document)
    }

    /// Lists every document of the client account.
    pub async fn documents(&self) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self.dispatch_into(Action::FetchAllDocuments, None).await?;
        for document in &mut documents {
            document.service = Some(self.clone());
        }
        Ok(documents)
    }

    /// Lists the documents attached to one user.
    pub async fn user_documents(&self, user: &dyn Consumer) -> Result<Vec<Document>> {
        if user.consumer_id().is_empty() {
            return Err(Error::Validation("user has an empty id".into()));
        }
        let mut documents: Vec<Document> = self
            .dispatch_into(Action::FetchUserDocuments, Some(params(&[("UserId", user.consumer_id())])))
            .await?;
        for document in &mut documents {
            document.service = Some(self.clone());
        }
        Ok(documents)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::{AuthMode, Credentials, Environment};
    use crate::model::user::User;

    fn service() -> Mango {
        let credentials = Credentials::new("partner", "secret", Environment::Sandbox);
        Mango::new(credentials, AuthMode::Basic).unwrap()
    }

    #[tokio::test]
    async fn test_new_document_requires_persisted_user() {
        let mango = service();
        let result = mango.new_document(&User::default(), document_type::IDENTITY_PROOF, "").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_unbound_document_cannot_upload_pages() {
        let document = Document::default();
        assert!(matches!(document.create_page(b"scan").await, Err(Error::Unbound)));
    }

    #[test]
    fn test_document_decodes_reply() {
        let document: Document = serde_json::from_value(json!({
            "Id": "1173530",
            "Tag": "",
            "CreationDate": 1431693145,
            "UserId": "U1",
            "Type": "IDENTITY_PROOF",
            "Status": "CREATED",
            "RefusedReasonMessage": "",
            "RefusedReasonType": ""
        }))
        .unwrap();
        assert_eq!(document.kind, "IDENTITY_PROOF");
        assert_eq!(document.status, document_status::CREATED);
    }
}
