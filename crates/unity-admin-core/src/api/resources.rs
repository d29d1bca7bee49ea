//! Typed calls for the platform's resources.
//!
//! Each method is a thin wrapper over the request pipeline; errors are the
//! pipeline's classified `ApiError`s.

use reqwest::multipart::{Form, Part};

use crate::models::{
    Assessment, AssessmentCreate, AssessmentResult, AssessmentUpdate, ImageType, ImageUpload,
    Platform, PlatformCreate, PlatformUpdate, Procedure, ProcedureCreate, ProcedureUpdate,
    Question, QuestionBank, QuestionBankCreate, QuestionCreate, User, UserCreate, UserUpdate,
};

use super::{ApiClient, ApiError};

type ApiResult<T> = Result<T, ApiError>;

const UNSUPPORTED_IMAGE: &str = "Invalid image type. Only JPEG, PNG, GIF are allowed.";

impl ApiClient {
    // ===== Platforms =====

    pub async fn list_platforms(&self) -> ApiResult<Vec<Platform>> {
        self.get("/platforms/").await
    }

    pub async fn get_platform(&self, platform_id: i64) -> ApiResult<Platform> {
        self.get(&format!("/platforms/{}", platform_id)).await
    }

    pub async fn create_platform(&self, platform: &PlatformCreate) -> ApiResult<Platform> {
        self.post("/platforms/", platform).await
    }

    pub async fn update_platform(
        &self,
        platform_id: i64,
        update: &PlatformUpdate,
    ) -> ApiResult<Platform> {
        self.put(&format!("/platforms/{}", platform_id), update).await
    }

    pub async fn delete_platform(&self, platform_id: i64) -> ApiResult<Platform> {
        self.delete(&format!("/platforms/{}", platform_id)).await
    }

    // ===== Question banks =====

    pub async fn list_question_banks(&self, platform_id: i64) -> ApiResult<Vec<QuestionBank>> {
        self.get(&format!("/platforms/{}/question-banks/", platform_id))
            .await
    }

    pub async fn create_question_bank(
        &self,
        platform_id: i64,
        bank: &QuestionBankCreate,
    ) -> ApiResult<QuestionBank> {
        self.post(&format!("/platforms/{}/question-banks/", platform_id), bank)
            .await
    }

    // ===== Procedures =====

    pub async fn list_procedures(&self, bank_id: i64) -> ApiResult<Vec<Procedure>> {
        self.get(&format!("/question-banks/{}/procedures/", bank_id))
            .await
    }

    pub async fn get_procedure(&self, bank_id: i64, procedure_id: i64) -> ApiResult<Procedure> {
        self.get(&format!(
            "/question-banks/{}/procedures/{}",
            bank_id, procedure_id
        ))
        .await
    }

    pub async fn create_procedure(
        &self,
        bank_id: i64,
        procedure: &ProcedureCreate,
    ) -> ApiResult<Procedure> {
        self.post(&format!("/question-banks/{}/procedures/", bank_id), procedure)
            .await
    }

    pub async fn update_procedure(
        &self,
        bank_id: i64,
        procedure_id: i64,
        update: &ProcedureUpdate,
    ) -> ApiResult<Procedure> {
        self.put(
            &format!("/question-banks/{}/procedures/{}", bank_id, procedure_id),
            update,
        )
        .await
    }

    pub async fn delete_procedure(&self, bank_id: i64, procedure_id: i64) -> ApiResult<Procedure> {
        self.delete(&format!(
            "/question-banks/{}/procedures/{}",
            bank_id, procedure_id
        ))
        .await
    }

    // ===== Questions =====

    pub async fn create_question(
        &self,
        procedure_id: i64,
        question: &QuestionCreate,
    ) -> ApiResult<Question> {
        self.post(&format!("/procedures/{}/questions/", procedure_id), question)
            .await
    }

    // ===== Assessments =====

    pub async fn list_assessments(&self) -> ApiResult<Vec<Assessment>> {
        self.get("/assessments/").await
    }

    pub async fn get_assessment(&self, assessment_id: i64) -> ApiResult<Assessment> {
        self.get(&format!("/assessments/{}", assessment_id)).await
    }

    pub async fn create_assessment(&self, assessment: &AssessmentCreate) -> ApiResult<Assessment> {
        self.post("/assessments/", assessment).await
    }

    pub async fn update_assessment(
        &self,
        assessment_id: i64,
        update: &AssessmentUpdate,
    ) -> ApiResult<Assessment> {
        self.put(&format!("/assessments/{}", assessment_id), update)
            .await
    }

    pub async fn delete_assessment(&self, assessment_id: i64) -> ApiResult<Assessment> {
        self.delete(&format!("/assessments/{}", assessment_id)).await
    }

    // ===== Results =====

    /// All examinee sessions recorded for an assessment.
    pub async fn list_assessment_results(
        &self,
        assessment_id: i64,
    ) -> ApiResult<Vec<AssessmentResult>> {
        self.get(&format!("/admin/assessments/{}/results/", assessment_id))
            .await
    }

    // ===== Users =====

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get("/users/").await
    }

    pub async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.get(&format!("/users/{}", user_id)).await
    }

    pub async fn create_user(&self, user: &UserCreate) -> ApiResult<User> {
        self.post("/users/", user).await
    }

    pub async fn update_user(&self, user_id: i64, user: &UserUpdate) -> ApiResult<User> {
        self.put(&format!("/users/{}", user_id), user).await
    }

    pub async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.delete(&format!("/users/{}", user_id)).await
    }

    // ===== Uploads =====

    /// Upload a question image. Only JPEG, PNG and GIF files are accepted;
    /// anything else is rejected locally the way the server would reject it.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<ImageUpload> {
        let image_type =
            ImageType::from_file_name(file_name).ok_or_else(|| ApiError::Validation {
                message: UNSUPPORTED_IMAGE.to_string(),
                fields: Vec::new(),
            })?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_type.mime())?;
        self.post_multipart("/utils/upload/image/", Form::new().part("file", part))
            .await
    }

    /// The account the current credential belongs to.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.post("/login/test-token", &serde_json::json!({})).await
    }
}
