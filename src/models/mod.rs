pub mod cadence;
pub mod compact;
pub mod form;

pub use cadence::Cadence;
pub use form::{DialogMode, FormField, ModelForm};

use crate::api::{ApiError, ModelRecord, StreamInfo};
use crate::picker::{self, PickerState};
use log::{info, warn};
use std::collections::HashSet;

pub const EMPTY_TEXT: &str = "No models found. Create your first model to get started.";
pub const DELETE_CONFIRM: &str = "Are you sure you want to delete this model?";
pub const SAVE_FAILED: &str = "Error saving model. Please try again.";
pub const DELETE_FAILED: &str = "Error deleting model. Please try again.";

/// 表格列表列：(表头, 紧凑显示标签)
pub const LIST_COLUMNS: [(&str, &str); 4] = [
    ("Past", "Past"),
    ("Target", "Targets"),
    ("Future", "Future"),
    ("Status", "Status"),
];

/// 打开中的编辑对话框
#[derive(Debug, Clone)]
pub struct ModelDialog {
    pub form: ModelForm,
    /// 当前展开的流多选框
    pub picker: Option<PickerState>,
    pub saving: bool,
}

impl ModelDialog {
    fn new(form: ModelForm) -> Self {
        Self {
            form,
            picker: None,
            saving: false,
        }
    }
}

/// Models 视图状态
#[derive(Debug, Default)]
pub struct ModelsPage {
    pub models: Vec<ModelRecord>,
    pub streams: Vec<StreamInfo>,
    pub loading: bool,
    fetching_models: bool,
    /// 请求进行中又发生了保存/删除，旧结果作废
    refetch_pending: bool,
    fetching_streams: bool,
    pub cursor: usize,
    /// 展开全部列表项的行（按模型 id）
    pub expanded: HashSet<String>,
    pub dialog: Option<ModelDialog>,
    /// 等待确认删除的模型 id
    pub confirm_delete: Option<String>,
    /// 需要用户关闭的错误提示
    pub alert: Option<String>,
}

impl ModelsPage {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    /// 请求中返回 false，调用方跳过本次请求
    pub fn begin_fetch_models(&mut self) -> bool {
        if self.fetching_models {
            info!("models fetch already in flight, skipping");
            return false;
        }
        self.fetching_models = true;
        true
    }

    /// 保存/删除后的刷新：已有请求在途时记下，等旧结果返回后重发
    pub fn request_refetch(&mut self) -> bool {
        if self.fetching_models {
            info!("models fetch in flight, refetch queued");
            self.refetch_pending = true;
            return false;
        }
        self.fetching_models = true;
        true
    }

    /// 返回 true 表示结果已作废，调用方需重新请求
    pub fn finish_fetch_models(&mut self, result: Result<Vec<ModelRecord>, ApiError>) -> bool {
        if self.refetch_pending {
            info!("drop models list fetched before last change, refetching");
            self.refetch_pending = false;
            return true;
        }
        self.fetching_models = false;
        self.loading = false;
        self.models = result.unwrap_or_else(|e| {
            warn!("fetch models failed: {}", e);
            Vec::new()
        });
        if self.cursor >= self.models.len() {
            self.cursor = self.models.len().saturating_sub(1);
        }
        let ids: HashSet<&String> = self.models.iter().map(|m| &m.id).collect();
        self.expanded.retain(|id| ids.contains(id));
        false
    }

    pub fn begin_fetch_streams(&mut self) -> bool {
        if self.fetching_streams {
            info!("streams fetch already in flight, skipping");
            return false;
        }
        self.fetching_streams = true;
        true
    }

    pub fn finish_fetch_streams(&mut self, result: Result<Vec<StreamInfo>, ApiError>) {
        self.fetching_streams = false;
        self.streams = result.unwrap_or_else(|e| {
            warn!("fetch streams failed: {}", e);
            Vec::new()
        });
        if let Some(dialog) = self.dialog.as_mut() {
            let field = dialog.form.focus;
            if let Some(state) = dialog.picker.as_mut() {
                let len =
                    picker::filter_items(&self.streams, &state.search, dialog.form.list(field)).len();
                state.clamp(len);
            }
        }
    }

    pub fn selected(&self) -> Option<&ModelRecord> {
        self.models.get(self.cursor)
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.models.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_row_lists(&mut self) {
        let Some(id) = self.selected().map(|m| m.id.clone()) else {
            return;
        };
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn open_create(&mut self) {
        self.dialog = Some(ModelDialog::new(ModelForm::create()));
    }

    pub fn open_edit(&mut self) -> bool {
        let Some(record) = self.selected() else {
            return false;
        };
        self.dialog = Some(ModelDialog::new(ModelForm::edit(record)));
        true
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// 校验通过返回 (模式, 记录)；正在保存时不重复提交
    pub fn submit_dialog(&mut self) -> Option<(DialogMode, ModelRecord)> {
        let dialog = self.dialog.as_mut()?;
        if dialog.saving {
            return None;
        }
        let record = dialog.form.submit()?;
        dialog.saving = true;
        Some((dialog.form.mode, record))
    }

    /// 保存结果；成功返回 true，调用方随后刷新列表
    pub fn save_finished(&mut self, result: Result<(), ApiError>) -> bool {
        match result {
            Ok(()) => {
                self.dialog = None;
                true
            }
            Err(e) => {
                warn!("save model failed: {}", e);
                if let Some(d) = self.dialog.as_mut() {
                    d.saving = false;
                }
                self.alert = Some(SAVE_FAILED.to_string());
                false
            }
        }
    }

    pub fn request_delete(&mut self) -> bool {
        match self.selected() {
            Some(m) => {
                self.confirm_delete = Some(m.id.clone());
                true
            }
            None => false,
        }
    }

    /// 确认后返回要删除的 id
    pub fn answer_delete(&mut self, confirmed: bool) -> Option<String> {
        let id = self.confirm_delete.take()?;
        confirmed.then_some(id)
    }

    pub fn delete_finished(&mut self, result: Result<(), ApiError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("delete model failed: {}", e);
                self.alert = Some(DELETE_FAILED.to_string());
                false
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
