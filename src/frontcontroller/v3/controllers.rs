use std::sync::Arc;

use super::ControllerV3;
use crate::error::Result;
use crate::frontcontroller::model::{required, required_u32};
use crate::frontcontroller::{keys, views, ModelView, ParamMap};
use crate::member::MemberRepository;

/// Shows the empty member form
pub struct MemberFormControllerV3;

impl ControllerV3 for MemberFormControllerV3 {
    fn process(&self, _params: &ParamMap) -> Result<ModelView> {
        Ok(ModelView::new(views::NEW_FORM))
    }
}

/// Saves a member from `username` and `age`
pub struct MemberSaveControllerV3 {
    repository: Arc<MemberRepository>,
}

impl MemberSaveControllerV3 {
    pub const fn new(repository: Arc<MemberRepository>) -> Self {
        Self { repository }
    }
}

impl ControllerV3 for MemberSaveControllerV3 {
    fn process(&self, params: &ParamMap) -> Result<ModelView> {
        let username = required(params, "username")?;
        let age = required_u32(params, "age")?;

        let member = self.repository.save(username, age);

        let mut model_view = ModelView::new(views::SAVE_RESULT);
        model_view.model_mut().put(keys::MEMBER, &member)?;
        Ok(model_view)
    }
}

/// Lists every saved member
pub struct MemberListControllerV3 {
    repository: Arc<MemberRepository>,
}

impl MemberListControllerV3 {
    pub const fn new(repository: Arc<MemberRepository>) -> Self {
        Self { repository }
    }
}

impl ControllerV3 for MemberListControllerV3 {
    fn process(&self, _params: &ParamMap) -> Result<ModelView> {
        let members = self.repository.find_all();

        let mut model_view = ModelView::new(views::MEMBERS);
        model_view.model_mut().put(keys::MEMBERS, &members)?;
        Ok(model_view)
    }
}
