use std::sync::Arc;

use super::ControllerV4;
use crate::error::Result;
use crate::frontcontroller::model::{required, required_u32};
use crate::frontcontroller::{keys, views, Model, ParamMap};
use crate::member::MemberRepository;

pub struct MemberFormControllerV4;

impl ControllerV4 for MemberFormControllerV4 {
    fn process(&self, _params: &ParamMap, _model: &mut Model) -> Result<String> {
        Ok(views::NEW_FORM.to_string())
    }
}

pub struct MemberSaveControllerV4 {
    repository: Arc<MemberRepository>,
}

impl MemberSaveControllerV4 {
    pub const fn new(repository: Arc<MemberRepository>) -> Self {
        Self { repository }
    }
}

impl ControllerV4 for MemberSaveControllerV4 {
    fn process(&self, params: &ParamMap, model: &mut Model) -> Result<String> {
        let username = required(params, "username")?;
        let age = required_u32(params, "age")?;

        let member = self.repository.save(username, age);
        model.put(keys::MEMBER, &member)?;
        Ok(views::SAVE_RESULT.to_string())
    }
}

pub struct MemberListControllerV4 {
    repository: Arc<MemberRepository>,
}

impl MemberListControllerV4 {
    pub const fn new(repository: Arc<MemberRepository>) -> Self {
        Self { repository }
    }
}

impl ControllerV4 for MemberListControllerV4 {
    fn process(&self, _params: &ParamMap, model: &mut Model) -> Result<String> {
        model.put(keys::MEMBERS, self.repository.find_all())?;
        Ok(views::MEMBERS.to_string())
    }
}
