//! Company profile: a singleton that is created once and updated afterwards.

use contentdesk_api_types::{Company, CompanyPayload};
use tracing::debug;

use crate::{
    application::{error::AppError, shell::Shell},
    domain::error::DomainError,
    infra::http::{ApiError, ApiRequest, RestClient},
};

const COMPANY_PATH: &str = "company";
const COMPANY_KEY: &str = "company";

#[derive(Clone)]
pub struct CompanyClient {
    rest: RestClient,
}

impl CompanyClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn fetch(&self) -> Result<Company, ApiError> {
        self.rest
            .field(ApiRequest::get(COMPANY_PATH), COMPANY_KEY, "회사 정보 조회 실패")
            .await
    }

    pub async fn create(&self, payload: &CompanyPayload) -> Result<Company, ApiError> {
        self.send(ApiRequest::post(COMPANY_PATH), payload, "회사 생성 실패")
            .await
    }

    pub async fn update(&self, payload: &CompanyPayload) -> Result<Company, ApiError> {
        self.send(ApiRequest::patch(COMPANY_PATH), payload, "회사 수정 실패")
            .await
    }

    async fn send(
        &self,
        request: ApiRequest,
        payload: &CompanyPayload,
        fallback: &str,
    ) -> Result<Company, ApiError> {
        let request = request.json(payload).map_err(|err| ApiError::Decode {
            message: fallback.to_string(),
            detail: err.to_string(),
        })?;
        self.rest.field(request, COMPANY_KEY, fallback).await
    }
}

/// Edit form state for the company profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyForm {
    pub name: String,
    pub postal_code: String,
    pub address: String,
    pub address_detail: String,
    pub phone: String,
    pub email: String,
    company: Option<Company>,
}

impl CompanyForm {
    /// Fetch the current record; a failed fetch means there is none yet.
    pub async fn load(client: &CompanyClient) -> Self {
        match client.fetch().await {
            Ok(company) => Self::from_company(company),
            Err(err) => {
                debug!(error = %err, "no company record; form starts empty");
                Self::default()
            }
        }
    }

    pub fn from_company(company: Company) -> Self {
        let mut form = Self::default();
        form.fill(company);
        form
    }

    pub fn company(&self) -> Option<&Company> {
        self.company.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.company.is_none()
    }

    /// Trimmed payload; blank optional fields are left out.
    pub fn payload(&self) -> Result<CompanyPayload, DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("회사명을 입력해주세요."));
        }
        Ok(CompanyPayload {
            name: Some(name.to_string()),
            postal_code: non_blank(&self.postal_code),
            address: non_blank(&self.address),
            address_detail: non_blank(&self.address_detail),
            phone: non_blank(&self.phone),
            email: non_blank(&self.email),
        })
    }

    /// Create on first save, update afterwards; the form is refilled from the server answer.
    pub async fn save(
        &mut self,
        client: &CompanyClient,
        shell: &dyn Shell,
    ) -> Result<Company, AppError> {
        let payload = self.payload()?;
        let (result, message) = if self.is_new() {
            (client.create(&payload).await, "회사 정보가 생성되었습니다.")
        } else {
            (client.update(&payload).await, "회사 정보가 수정되었습니다.")
        };
        let company = result?;
        shell.notify(message);
        self.fill(company.clone());
        Ok(company)
    }

    fn fill(&mut self, company: Company) {
        self.name = company.name.clone();
        self.postal_code = company.postal_code.clone().unwrap_or_default();
        self.address = company.address.clone().unwrap_or_default();
        self.address_detail = company.address_detail.clone().unwrap_or_default();
        self.phone = company.phone.clone().unwrap_or_default();
        self.email = company.email.clone().unwrap_or_default();
        self.company = Some(company);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn payload_requires_a_name() {
        let form = CompanyForm {
            name: "   ".into(),
            ..CompanyForm::default()
        };
        let err = form.payload().expect_err("name required");
        assert_eq!(err.to_string(), "회사명을 입력해주세요.");
    }

    #[test]
    fn payload_trims_and_drops_blank_fields() {
        let form = CompanyForm {
            name: " Acme ".into(),
            phone: " 02-000-0000 ".into(),
            email: "  ".into(),
            ..CompanyForm::default()
        };
        let payload = form.payload().expect("valid");
        assert_eq!(payload.name.as_deref(), Some("Acme"));
        assert_eq!(payload.phone.as_deref(), Some("02-000-0000"));
        assert_eq!(payload.email, None);
        assert_eq!(
            serde_json::to_value(&payload).expect("json"),
            serde_json::json!({"name": "Acme", "phone": "02-000-0000"})
        );
    }

    #[test]
    fn form_built_from_a_record_mirrors_it() {
        let company = Company {
            id: 1,
            name: "Acme".into(),
            postal_code: Some("04524".into()),
            address: Some("Seoul".into()),
            address_detail: None,
            phone: None,
            email: Some("hello@acme.example".into()),
            created_at: datetime!(2025-01-02 3:04 UTC),
            updated_at: datetime!(2025-01-02 3:04 UTC),
        };
        let form = CompanyForm::from_company(company.clone());

        assert_eq!(form, CompanyForm::from_company(company.clone()));
        assert_ne!(form, CompanyForm::default());
        assert!(!form.is_new());
        assert_eq!(form.company(), Some(&company));
        assert_eq!(form.postal_code, "04524");
        assert_eq!(form.address_detail, "");
    }
}
