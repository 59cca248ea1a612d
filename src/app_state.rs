use crate::api::{ApiError, Endpoint, ModelRecord, StreamInfo};
use crate::browser::BrowserState;
use crate::commands::ui_command::completion_hint;
use crate::commands::{AppCommand, Consumer, ThemeArg, UiCommand};
use crate::models::ModelsPage;
use crate::picker::{self, PickerState};
use crate::series::range::{next_count, prev_count};
use crate::series::{ModelPanel, ModelRequest, SeriesData, StreamPanel, StreamRequest, TimeRange};
use crate::theme::{Theme, ThemeStore};
use chrono::Utc;
use crossterm::event::KeyCode;
use log::{info, warn};
use serde_json::Value;
use std::str::FromStr;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    Home,
    Configuration,
    Timeseries,
    Tiles,
    Models,
    ModelTimeseries,
    About,
}

impl ViewMode {
    /// 左侧菜单顺序
    pub const ALL: [ViewMode; 7] = [
        ViewMode::Home,
        ViewMode::Configuration,
        ViewMode::Timeseries,
        ViewMode::Tiles,
        ViewMode::Models,
        ViewMode::ModelTimeseries,
        ViewMode::About,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Home => "Home",
            ViewMode::Configuration => "Configuration",
            ViewMode::Timeseries => "Timeseries",
            ViewMode::Tiles => "Tiles",
            ViewMode::Models => "Models",
            ViewMode::ModelTimeseries => "Model TimeSeries",
            ViewMode::About => "About",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Collection {
        endpoint: Endpoint,
        result: Result<Vec<Value>, ApiError>,
    },
    Models {
        consumer: Consumer,
        result: Result<Vec<ModelRecord>, ApiError>,
    },
    Streams {
        consumer: Consumer,
        result: Result<Vec<StreamInfo>, ApiError>,
    },
    ModelSaved(Result<(), ApiError>),
    ModelDeleted(Result<(), ApiError>),
    StreamSeries {
        generation: u64,
        data: SeriesData,
    },
    ModelSeries {
        generation: u64,
        data: SeriesData,
    },
    ConnectionTested(Result<(), ApiError>),
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub theme: Theme,
    pub theme_store: ThemeStore,
    pub browser: BrowserState,
    pub stream_panel: StreamPanel,
    pub model_panel: ModelPanel,
    pub models_page: ModelsPage,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        theme: Theme,
        theme_store: ThemeStore,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            view_mode: ViewMode::Home,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::Menu,
            menu_selected_index: 0,
            theme,
            theme_store,
            browser: BrowserState::default(),
            stream_panel: StreamPanel::new(),
            model_panel: ModelPanel::new(),
            models_page: ModelsPage::new(),
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    fn send(&self, cmd: AppCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("command channel closed");
        }
    }

    /// 获取当前的预测建议
    pub fn get_completion_hint(&self) -> Option<String> {
        completion_hint(&self.command_input[..self.command_cursor.min(self.command_input.len())])
    }

    // ---- 视图切换与数据请求 ----

    /// 切换视图并触发该视图的数据请求
    pub fn enter_view(&mut self, view: ViewMode) {
        self.view_mode = view;
        if let Some(idx) = ViewMode::ALL.iter().position(|v| *v == view) {
            self.menu_selected_index = idx;
        }
        info!("enter view {}", view.label());
        self.load_view();
    }

    fn load_view(&mut self) {
        match self.view_mode {
            ViewMode::Configuration => {
                let endpoint = self.browser.select_endpoint(self.browser.endpoint);
                self.send(AppCommand::FetchCollection { endpoint });
            }
            ViewMode::Timeseries => {
                self.send(AppCommand::FetchStreams {
                    consumer: Consumer::StreamSeries,
                });
                // 已选的流重新取数
                let req = self.stream_panel.refresh(Utc::now());
                self.send_stream_request(req);
            }
            ViewMode::Models => self.load_models_page(),
            ViewMode::ModelTimeseries => {
                self.send(AppCommand::FetchModels {
                    consumer: Consumer::ModelSeries,
                });
                self.send(AppCommand::FetchStreams {
                    consumer: Consumer::ModelSeries,
                });
            }
            ViewMode::Home | ViewMode::Tiles | ViewMode::About => {}
        }
    }

    fn load_models_page(&mut self) {
        if self.models_page.begin_fetch_models() {
            self.send(AppCommand::FetchModels {
                consumer: Consumer::ModelsPage,
            });
        } else {
            self.add_log("⚠ 模型列表正在加载，跳过本次请求".to_string());
        }
        if self.models_page.begin_fetch_streams() {
            self.send(AppCommand::FetchStreams {
                consumer: Consumer::ModelsPage,
            });
        } else {
            self.add_log("⚠ 流列表正在加载，跳过本次请求".to_string());
        }
    }

    fn refetch_models(&mut self) {
        if self.models_page.request_refetch() {
            self.send(AppCommand::FetchModels {
                consumer: Consumer::ModelsPage,
            });
        }
    }

    fn switch_endpoint(&mut self, endpoint: Endpoint) {
        let endpoint = self.browser.select_endpoint(endpoint);
        self.send(AppCommand::FetchCollection { endpoint });
    }

    fn send_stream_request(&self, req: Option<StreamRequest>) {
        if let Some(req) = req {
            self.send(AppCommand::FetchStreamSeries(req));
        }
    }

    fn send_model_request(&self, req: Option<ModelRequest>) {
        if let Some(req) = req {
            self.send(AppCommand::FetchModelSeries(req));
        }
    }

    fn set_range(&mut self, range: TimeRange) {
        let now = Utc::now();
        match self.view_mode {
            ViewMode::Timeseries => {
                let req = self.stream_panel.set_range(range, now);
                self.send_stream_request(req);
            }
            ViewMode::ModelTimeseries => {
                let req = self.model_panel.set_range(range, now);
                self.send_model_request(req);
            }
            _ => self.add_log("⚠ 当前视图没有时间范围".to_string()),
        }
    }

    fn set_count(&mut self, count: u32) {
        let now = Utc::now();
        match self.view_mode {
            ViewMode::Timeseries => {
                let req = self.stream_panel.set_count(count, now);
                self.send_stream_request(req);
            }
            ViewMode::ModelTimeseries => {
                let req = self.model_panel.set_count(count, now);
                self.send_model_request(req);
            }
            _ => self.add_log("⚠ 当前视图没有数据点数".to_string()),
        }
    }

    /// 刷新当前视图
    fn refresh(&mut self) {
        let now = Utc::now();
        match self.view_mode {
            ViewMode::Configuration => self.switch_endpoint(self.browser.endpoint),
            ViewMode::Timeseries => {
                let req = self.stream_panel.refresh(now);
                self.send_stream_request(req);
            }
            ViewMode::ModelTimeseries => {
                let req = self.model_panel.refresh(now);
                self.send_model_request(req);
            }
            ViewMode::Models => self.load_models_page(),
            _ => {}
        }
    }

    fn test_connection(&mut self) {
        if self.browser.probe.begin() {
            self.send(AppCommand::TestConnection);
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        match self.theme_store.save(theme) {
            Ok(()) => self.add_log(format!("✓ 主题已切换: {}", theme.name())),
            Err(e) => {
                warn!("save theme failed: {:#}", e);
                self.add_log(format!("✗ 保存主题失败: {:#}", e));
            }
        }
    }

    fn toggle_axis(&mut self) {
        match self.view_mode {
            ViewMode::Timeseries => self.stream_panel.axis = self.stream_panel.axis.toggle(),
            ViewMode::ModelTimeseries => self.model_panel.axis = self.model_panel.axis.toggle(),
            _ => {}
        }
    }

    fn toggle_chart_kind(&mut self) {
        match self.view_mode {
            ViewMode::Timeseries => self.stream_panel.kind = self.stream_panel.kind.toggle(),
            ViewMode::ModelTimeseries => self.model_panel.kind = self.model_panel.kind.toggle(),
            _ => {}
        }
    }

    // ---- 后台事件 ----

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.log_messages.push(msg)
            }
            AppEvent::Collection { endpoint, result } => {
                if !self.browser.apply_result(endpoint, result) {
                    info!("drop stale {} collection", endpoint.path());
                }
            }
            AppEvent::Models { consumer, result } => match consumer {
                Consumer::ModelsPage => {
                    if self.models_page.finish_fetch_models(result) {
                        self.send(AppCommand::FetchModels {
                            consumer: Consumer::ModelsPage,
                        });
                    }
                }
                Consumer::ModelSeries => {
                    self.model_panel.models = result.unwrap_or_default();
                    if self.model_panel.cursor >= self.model_panel.models.len() {
                        self.model_panel.cursor = 0;
                    }
                }
                Consumer::StreamSeries => {}
            },
            AppEvent::Streams { consumer, result } => match consumer {
                Consumer::ModelsPage => self.models_page.finish_fetch_streams(result),
                Consumer::StreamSeries => {
                    self.stream_panel.set_streams(result.unwrap_or_default());
                }
                Consumer::ModelSeries => {
                    self.model_panel.streams = result.unwrap_or_default();
                }
            },
            AppEvent::ModelSaved(result) => {
                if self.models_page.save_finished(result) {
                    self.refetch_models();
                }
            }
            AppEvent::ModelDeleted(result) => {
                if self.models_page.delete_finished(result) {
                    self.refetch_models();
                }
            }
            AppEvent::StreamSeries { generation, data } => {
                if !self.stream_panel.apply(generation, data) {
                    info!("drop stale stream series (generation {})", generation);
                }
            }
            AppEvent::ModelSeries { generation, data } => {
                if !self.model_panel.apply(generation, data) {
                    info!("drop stale model series (generation {})", generation);
                }
            }
            AppEvent::ConnectionTested(result) => {
                self.browser.probe.finish(result.is_ok(), Instant::now());
            }
        }
    }

    /// 每帧调用：连接测试结果到期后复位
    pub fn tick(&mut self, now: Instant) {
        self.browser.probe.expire(now);
    }

    // ---- 命令行 ----

    /// 执行一条命令，返回 true 表示退出
    fn run_command(&mut self, line: &str) -> bool {
        let Ok(cmd) = UiCommand::from_str(line) else {
            self.send(AppCommand::Unknown(line.to_string()));
            return false;
        };
        match cmd {
            UiCommand::Endpoint(endpoint) => {
                self.view_mode = ViewMode::Configuration;
                self.menu_selected_index = 1;
                self.switch_endpoint(endpoint);
            }
            UiCommand::Refresh => self.refresh(),
            UiCommand::Test => self.test_connection(),
            UiCommand::Range(range) => self.set_range(range),
            UiCommand::Count(count) => self.set_count(count),
            UiCommand::Theme(ThemeArg::Toggle) => self.set_theme(self.theme.toggle()),
            UiCommand::Theme(ThemeArg::Set(theme)) => self.set_theme(theme),
            UiCommand::Axis(mode) => match self.view_mode {
                ViewMode::Timeseries => self.stream_panel.axis = mode,
                ViewMode::ModelTimeseries => self.model_panel.axis = mode,
                _ => self.add_log("⚠ 当前视图没有图表".to_string()),
            },
            UiCommand::Chart(kind) => match self.view_mode {
                ViewMode::Timeseries => self.stream_panel.kind = kind,
                ViewMode::ModelTimeseries => self.model_panel.kind = kind,
                _ => self.add_log("⚠ 当前视图没有图表".to_string()),
            },
            UiCommand::ModelNew => {
                if self.view_mode != ViewMode::Models {
                    self.enter_view(ViewMode::Models);
                }
                self.focus_area = FocusArea::MainView;
                self.models_page.open_create();
            }
            UiCommand::ModelDelete => {
                if self.view_mode != ViewMode::Models || !self.models_page.request_delete() {
                    self.add_log("⚠ 请先在 Models 视图中选中一个模型".to_string());
                }
            }
            UiCommand::Help => self.send(AppCommand::Help),
            UiCommand::Quit => return true,
            UiCommand::Unknown(msg) => self.send(AppCommand::Unknown(msg)),
        }
        false
    }

    fn reset_command_line(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.command_input.trim().to_string();
                self.reset_command_line();
                if cmd_owned.is_empty() {
                    return false;
                }
                self.command_history.push(cmd_owned.clone());
                self.command_history_index = None;
                return self.run_command(&cmd_owned);
            }
            KeyCode::Esc => self.reset_command_line(),
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    let insert = format!("{} ", hint);
                    self.command_input.insert_str(self.command_cursor, &insert);
                    self.command_cursor += insert.len();
                }
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len().saturating_sub(1),
                    Some(i) => i.saturating_sub(1),
                };
                self.command_history_index = Some(next);
                if let Some(cmd) = self.command_history.get(next) {
                    self.command_input = cmd.clone();
                    self.command_cursor = self.command_input.len();
                }
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                let n = i + 1;
                if n >= self.command_history.len() {
                    self.command_history_index = None;
                    self.command_input.clear();
                    self.command_cursor = 0;
                    return false;
                }
                self.command_history_index = Some(n);
                if let Some(cmd) = self.command_history.get(n) {
                    self.command_input = cmd.clone();
                    self.command_cursor = self.command_input.len();
                }
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let idx = prev_char_boundary(&self.command_input, self.command_cursor);
                    self.command_input.remove(idx);
                    self.command_cursor = idx;
                }
            }
            KeyCode::Delete => {
                if self.command_cursor < self.command_input.len() {
                    self.command_input.remove(self.command_cursor);
                }
            }
            KeyCode::Left => {
                if self.command_cursor > 0 {
                    self.command_cursor = prev_char_boundary(&self.command_input, self.command_cursor);
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.command_input[self.command_cursor..].chars().next() {
                    self.command_cursor += c.len_utf8();
                }
            }
            KeyCode::Home => self.command_cursor = 0,
            KeyCode::End => self.command_cursor = self.command_input.len(),
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
            }
            _ => {}
        }
        false
    }

    // ---- 弹出层 ----

    /// 当前视图有弹出层时由其处理按键，返回 true 表示已处理
    fn handle_overlay_key(&mut self, key: KeyCode) -> bool {
        match self.view_mode {
            ViewMode::Models => self.handle_models_overlay(key),
            ViewMode::Timeseries if self.stream_panel.picker_open => {
                self.handle_stream_picker(key);
                true
            }
            ViewMode::ModelTimeseries if self.model_panel.list_open => {
                self.handle_model_list(key);
                true
            }
            _ => false,
        }
    }

    fn handle_models_overlay(&mut self, key: KeyCode) -> bool {
        if self.models_page.alert.is_some() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.models_page.dismiss_alert();
            }
            return true;
        }
        if self.models_page.confirm_delete.is_some() {
            let answer = match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
                _ => None,
            };
            if let Some(confirmed) = answer {
                if let Some(asset_id) = self.models_page.answer_delete(confirmed) {
                    self.send(AppCommand::DeleteModel { asset_id });
                }
            }
            return true;
        }
        if self.models_page.dialog.is_some() {
            self.handle_dialog_key(key);
            return true;
        }
        false
    }

    fn handle_dialog_key(&mut self, key: KeyCode) {
        let streams = &self.models_page.streams;
        let Some(dialog) = self.models_page.dialog.as_mut() else {
            return;
        };
        let field = dialog.form.focus;

        if let Some(state) = dialog.picker.as_mut() {
            let selected = dialog.form.list(field).to_vec();
            match key {
                KeyCode::Esc => dialog.picker = None,
                KeyCode::Up => state.up(),
                KeyCode::Down => {
                    let len = picker::filter_items(streams, &state.search, &selected).len();
                    state.down(len);
                }
                KeyCode::Enter => {
                    if let Some(id) = state.current_id(streams, &selected) {
                        dialog.form.toggle_stream(field, &id);
                    }
                }
                KeyCode::Backspace => state.pop_char(),
                KeyCode::Char(c) => state.push_char(c),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => self.models_page.close_dialog(),
            KeyCode::Tab | KeyCode::Down => dialog.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => dialog.form.focus_prev(),
            KeyCode::Left if field == crate::models::FormField::ModelType => {
                dialog.form.cycle_model_type(false)
            }
            KeyCode::Right if field == crate::models::FormField::ModelType => {
                dialog.form.cycle_model_type(true)
            }
            KeyCode::Enter if field.is_stream_list() => {
                dialog.picker = Some(PickerState::default());
            }
            KeyCode::Enter => {
                if let Some((mode, record)) = self.models_page.submit_dialog() {
                    self.send(AppCommand::SaveModel { mode, record });
                } else {
                    self.add_log("⚠ 表单校验未通过".to_string());
                }
            }
            KeyCode::Backspace => dialog.form.pop_char(),
            KeyCode::Char(c) => dialog.form.push_char(c),
            _ => {}
        }
    }

    fn handle_stream_picker(&mut self, key: KeyCode) {
        let panel = &mut self.stream_panel;
        match key {
            KeyCode::Esc => {
                panel.picker_open = false;
                panel.picker.reset();
            }
            KeyCode::Up => panel.picker.up(),
            KeyCode::Down => {
                let len = picker::filter_items(&panel.streams, &panel.picker.search, &panel.selected)
                    .len();
                panel.picker.down(len);
            }
            KeyCode::Enter => {
                if let Some(id) = panel.picker.current_id(&panel.streams, &panel.selected) {
                    let req = panel.toggle_stream(&id, Utc::now());
                    self.send_stream_request(req);
                }
            }
            KeyCode::Backspace => panel.picker.pop_char(),
            KeyCode::Char(c) => panel.picker.push_char(c),
            _ => {}
        }
    }

    fn handle_model_list(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.model_panel.list_open = false,
            KeyCode::Up => self.model_panel.cursor_up(),
            KeyCode::Down => self.model_panel.cursor_down(),
            KeyCode::Enter => {
                self.model_panel.list_open = false;
                if let Some(id) = self.model_panel.model_at_cursor() {
                    let req = self.model_panel.select_model(&id, Utc::now());
                    self.send_model_request(req);
                }
            }
            _ => {}
        }
    }

    // ---- 主视图按键 ----

    fn handle_main_view_key(&mut self, key: KeyCode) {
        match self.view_mode {
            ViewMode::Configuration => match key {
                KeyCode::Up => self.browser.cursor_up(),
                KeyCode::Down => self.browser.cursor_down(),
                KeyCode::Char(']') => self.switch_endpoint(self.browser.endpoint.next()),
                KeyCode::Char('[') => self.switch_endpoint(self.browser.endpoint.prev()),
                KeyCode::Char('n') | KeyCode::PageDown => self.browser.next_page(),
                KeyCode::Char('p') | KeyCode::PageUp => self.browser.previous_page(),
                KeyCode::Enter => {
                    let cursor = self.browser.cursor;
                    self.browser.toggle_expanded(cursor);
                }
                KeyCode::Char('t') => self.test_connection(),
                KeyCode::Char('r') => self.refresh(),
                _ => {}
            },
            ViewMode::Timeseries | ViewMode::ModelTimeseries => {
                let timeseries = self.view_mode == ViewMode::Timeseries;
                match key {
                    KeyCode::Char('s') if timeseries => self.stream_panel.picker_open = true,
                    KeyCode::Char('m') | KeyCode::Enter if !timeseries => {
                        self.model_panel.list_open = true
                    }
                    KeyCode::Char(']') => {
                        let range = self.current_range().next();
                        self.set_range(range);
                    }
                    KeyCode::Char('[') => {
                        let range = self.current_range().prev();
                        self.set_range(range);
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        let count = next_count(self.current_count());
                        self.set_count(count);
                    }
                    KeyCode::Char('-') => {
                        let count = prev_count(self.current_count());
                        self.set_count(count);
                    }
                    KeyCode::Char('a') => self.toggle_axis(),
                    KeyCode::Char('g') => self.toggle_chart_kind(),
                    KeyCode::Char('r') => self.refresh(),
                    _ => {}
                }
            }
            ViewMode::Models => match key {
                KeyCode::Up => self.models_page.cursor_up(),
                KeyCode::Down => self.models_page.cursor_down(),
                KeyCode::Char('n') => self.models_page.open_create(),
                KeyCode::Enter => {
                    self.models_page.open_edit();
                }
                KeyCode::Char('d') => {
                    self.models_page.request_delete();
                }
                KeyCode::Char('e') => self.models_page.toggle_row_lists(),
                KeyCode::Char('r') => self.refresh(),
                _ => {}
            },
            ViewMode::Home | ViewMode::Tiles | ViewMode::About => {}
        }
    }

    fn current_range(&self) -> TimeRange {
        match self.view_mode {
            ViewMode::ModelTimeseries => self.model_panel.range,
            _ => self.stream_panel.range,
        }
    }

    fn current_count(&self) -> u32 {
        match self.view_mode {
            ViewMode::ModelTimeseries => self.model_panel.count,
            _ => self.stream_panel.count,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            return self.handle_command_key(key);
        }

        if self.focus_area == FocusArea::MainView && self.handle_overlay_key(key) {
            return false;
        }

        // 正常模式下的按键处理
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
                false
            }
            KeyCode::Char('q') => {
                true // 退出应用
            }
            KeyCode::Char('T') => {
                self.set_theme(self.theme.toggle());
                false
            }
            KeyCode::Left | KeyCode::Esc => {
                // 切换到菜单焦点
                self.focus_area = FocusArea::Menu;
                false
            }
            KeyCode::Right => {
                self.focus_area = FocusArea::MainView;
                false
            }
            KeyCode::Up if self.focus_area == FocusArea::Menu => {
                self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                false
            }
            KeyCode::Down if self.focus_area == FocusArea::Menu => {
                if self.menu_selected_index + 1 < ViewMode::ALL.len() {
                    self.menu_selected_index += 1;
                }
                false
            }
            KeyCode::Enter if self.focus_area == FocusArea::Menu => {
                // 根据菜单选择切换视图，确认后焦点移到主视图
                let view = ViewMode::ALL[self.menu_selected_index.min(ViewMode::ALL.len() - 1)];
                self.enter_view(view);
                self.focus_area = FocusArea::MainView;
                false
            }
            _ => {
                if self.focus_area == FocusArea::MainView {
                    self.handle_main_view_key(key);
                }
                false
            }
        }
    }
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::probe::ProbeStatus;
    use crate::models::DialogMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
        _dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = ThemeStore::new(dir.path().join("state.json"));
            let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
            let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
            let app = App::new(Vec::new(), Theme::Light, store, cmd_tx, evt_rx);
            Harness {
                app,
                cmd_rx,
                _dir: dir,
            }
        }

        fn sent(&mut self) -> Vec<AppCommand> {
            let mut out = Vec::new();
            while let Ok(c) = self.cmd_rx.try_recv() {
                out.push(c);
            }
            out
        }

        fn keys(&mut self, keys: &[KeyCode]) {
            for k in keys {
                self.app.handle_key_event(*k);
            }
        }

        fn command(&mut self, line: &str) -> bool {
            self.app.handle_key_event(KeyCode::Char('/'));
            for c in line.chars() {
                self.app.handle_key_event(KeyCode::Char(c));
            }
            self.app.handle_key_event(KeyCode::Enter)
        }

        fn open(&mut self, view: ViewMode) {
            self.app.enter_view(view);
            self.app.focus_area = FocusArea::MainView;
        }
    }

    fn rows(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i, "meta": {"k": i}})).collect()
    }

    fn model(id: &str) -> ModelRecord {
        ModelRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            ..Default::default()
        }
    }

    #[test]
    fn menu_enter_switches_view_and_fetches() {
        let mut h = Harness::new();
        h.keys(&[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(h.app.view_mode, ViewMode::Configuration);
        assert_eq!(h.app.focus_area, FocusArea::MainView);
        assert!(matches!(
            h.sent()[..],
            [AppCommand::FetchCollection {
                endpoint: Endpoint::Streams
            }]
        ));
    }

    #[test]
    fn switching_endpoint_resets_page_and_expansion() {
        let mut h = Harness::new();
        h.open(ViewMode::Configuration);
        h.app.handle_event(AppEvent::Collection {
            endpoint: Endpoint::Streams,
            result: Ok(rows(45)),
        });
        h.keys(&[KeyCode::Char('n'), KeyCode::Enter]);
        assert_eq!(h.app.browser.pager.page(), 2);
        assert_eq!(h.app.browser.expanded.len(), 1);
        h.sent();

        h.keys(&[KeyCode::Char(']')]);
        assert!(matches!(
            h.sent()[..],
            [AppCommand::FetchCollection {
                endpoint: Endpoint::AssetTypes
            }]
        ));
        // 旧集合的迟到结果被丢弃
        h.app.handle_event(AppEvent::Collection {
            endpoint: Endpoint::Streams,
            result: Ok(rows(3)),
        });
        assert_eq!(h.app.browser.data.len(), 45);

        h.app.handle_event(AppEvent::Collection {
            endpoint: Endpoint::AssetTypes,
            result: Ok(rows(30)),
        });
        assert_eq!(h.app.browser.pager.page(), 1);
        assert!(h.app.browser.expanded.is_empty());
    }

    #[test]
    fn connection_probe_ignores_second_press() {
        let mut h = Harness::new();
        h.open(ViewMode::Configuration);
        h.sent();
        h.keys(&[KeyCode::Char('t'), KeyCode::Char('t')]);
        assert_eq!(h.sent().len(), 1);
        assert_eq!(h.app.browser.probe.label(), "Testing...");

        h.app.handle_event(AppEvent::ConnectionTested(Ok(())));
        assert!(matches!(
            h.app.browser.probe.status(),
            ProbeStatus::Connected(_)
        ));
        h.app
            .tick(Instant::now() + std::time::Duration::from_secs(4));
        assert_eq!(h.app.browser.probe.label(), "Test Connection");
    }

    #[test]
    fn range_change_clears_chart_and_drops_stale_series() {
        let mut h = Harness::new();
        h.open(ViewMode::Timeseries);
        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::StreamSeries,
            result: Ok(vec![StreamInfo {
                id: "s1".to_string(),
                ..Default::default()
            }]),
        });
        h.sent();

        h.keys(&[KeyCode::Char('s'), KeyCode::Enter, KeyCode::Esc]);
        let first = match h.sent().pop() {
            Some(AppCommand::FetchStreamSeries(req)) => req,
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(first.stream_ids, vec!["s1".to_string()]);
        h.app.handle_event(AppEvent::StreamSeries {
            generation: first.generation,
            data: SeriesData {
                categories: vec!["08:00".to_string()],
                series: vec![("s1".to_string(), vec![1.0])],
            },
        });
        assert!(!h.app.stream_panel.data.is_empty());

        h.keys(&[KeyCode::Char(']')]);
        assert!(h.app.stream_panel.data.series.is_empty());
        assert_eq!(h.app.stream_panel.range, TimeRange::EightHours);

        h.app.handle_event(AppEvent::StreamSeries {
            generation: first.generation,
            data: SeriesData {
                categories: vec!["08:00".to_string()],
                series: vec![("s1".to_string(), vec![9.0])],
            },
        });
        assert!(h.app.stream_panel.data.series.is_empty());
        assert!(h.app.stream_panel.loading);
    }

    #[test]
    fn reentering_timeseries_refetches_selected_streams() {
        let mut h = Harness::new();
        h.open(ViewMode::Timeseries);
        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::StreamSeries,
            result: Ok(vec![StreamInfo {
                id: "s1".to_string(),
                ..Default::default()
            }]),
        });
        h.keys(&[KeyCode::Char('s'), KeyCode::Enter, KeyCode::Esc]);
        h.sent();

        h.app.enter_view(ViewMode::Home);
        h.open(ViewMode::Timeseries);
        let sent = h.sent();
        assert!(matches!(
            sent[0],
            AppCommand::FetchStreams {
                consumer: Consumer::StreamSeries
            }
        ));
        match &sent[1] {
            AppCommand::FetchStreamSeries(req) => {
                assert_eq!(req.stream_ids, vec!["s1".to_string()]);
                assert_eq!(req.generation, h.app.stream_panel.generation());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn shrinking_stream_list_clamps_open_picker() {
        let mut h = Harness::new();
        h.open(ViewMode::Timeseries);
        let stream = |id: &str| StreamInfo {
            id: id.to_string(),
            ..Default::default()
        };
        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::StreamSeries,
            result: Ok(vec![stream("a"), stream("b"), stream("c")]),
        });
        h.keys(&[KeyCode::Char('s'), KeyCode::Down, KeyCode::Down]);
        assert_eq!(h.app.stream_panel.picker.cursor, 2);

        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::StreamSeries,
            result: Ok(vec![stream("b")]),
        });
        assert_eq!(h.app.stream_panel.picker.cursor, 0);
        h.keys(&[KeyCode::Enter]);
        assert_eq!(h.app.stream_panel.selected, vec!["b".to_string()]);
    }

    #[test]
    fn count_command_applies_to_model_panel() {
        let mut h = Harness::new();
        h.open(ViewMode::ModelTimeseries);
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelSeries,
            result: Ok(vec![model("m1")]),
        });
        h.sent();
        h.keys(&[KeyCode::Char('m'), KeyCode::Enter]);
        match h.sent().pop() {
            Some(AppCommand::FetchModelSeries(req)) => assert_eq!(req.count, 600),
            other => panic!("unexpected command: {:?}", other),
        }
        h.command("count 5000");
        match h.sent().pop() {
            Some(AppCommand::FetchModelSeries(req)) => assert_eq!(req.count, 5000),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn empty_required_field_blocks_save() {
        let mut h = Harness::new();
        h.open(ViewMode::Models);
        h.sent();
        h.keys(&[KeyCode::Char('n'), KeyCode::Enter]);
        assert!(h.sent().is_empty());
        let dialog = h.app.models_page.dialog.as_ref().unwrap();
        assert_eq!(
            dialog.form.errors.get(&crate::models::FormField::Id).map(String::as_str),
            Some("ID is required")
        );
    }

    #[test]
    fn confirmed_delete_refetches_and_row_disappears() {
        let mut h = Harness::new();
        h.open(ViewMode::Models);
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m1"), model("m2")]),
        });
        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::ModelsPage,
            result: Ok(Vec::new()),
        });
        h.sent();

        h.keys(&[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert!(matches!(
            &h.sent()[..],
            [AppCommand::DeleteModel { asset_id }] if asset_id == "m1"
        ));
        assert_eq!(h.app.models_page.models.len(), 2);

        h.app.handle_event(AppEvent::ModelDeleted(Ok(())));
        assert!(matches!(
            h.sent()[..],
            [AppCommand::FetchModels {
                consumer: Consumer::ModelsPage
            }]
        ));
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m2")]),
        });
        assert_eq!(h.app.models_page.models.len(), 1);
        assert_eq!(h.app.models_page.models[0].id, "m2");
    }

    #[test]
    fn delete_during_inflight_fetch_still_reloads() {
        let mut h = Harness::new();
        h.open(ViewMode::Models);
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m1"), model("m2")]),
        });
        h.app.handle_event(AppEvent::Streams {
            consumer: Consumer::ModelsPage,
            result: Ok(Vec::new()),
        });
        // 刷新请求尚未返回
        h.keys(&[KeyCode::Char('r')]);
        h.sent();

        h.keys(&[KeyCode::Char('d'), KeyCode::Char('y')]);
        h.sent();
        h.app.handle_event(AppEvent::ModelDeleted(Ok(())));
        assert!(h.sent().is_empty());

        // 删除前发出的请求返回旧列表：丢弃并重新请求
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m1"), model("m2")]),
        });
        assert!(matches!(
            h.sent()[..],
            [AppCommand::FetchModels {
                consumer: Consumer::ModelsPage
            }]
        ));

        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m2")]),
        });
        assert!(h.sent().is_empty());
        assert_eq!(h.app.models_page.models.len(), 1);
        assert_eq!(h.app.models_page.models[0].id, "m2");
    }

    #[test]
    fn failed_save_raises_blocking_alert() {
        let mut h = Harness::new();
        h.open(ViewMode::Models);
        h.app.handle_event(AppEvent::Models {
            consumer: Consumer::ModelsPage,
            result: Ok(vec![model("m1")]),
        });
        h.keys(&[KeyCode::Enter]);
        assert_eq!(
            h.app.models_page.dialog.as_ref().map(|d| d.form.mode),
            Some(DialogMode::Edit)
        );
        h.app.models_page.dialog.as_mut().unwrap().saving = true;
        h.app.handle_event(AppEvent::ModelSaved(Err(ApiError::Timeout)));
        assert!(h.app.models_page.alert.is_some());

        // 提示框拦截其它按键
        h.keys(&[KeyCode::Char('d')]);
        assert!(h.app.models_page.confirm_delete.is_none());
        h.keys(&[KeyCode::Enter]);
        assert!(h.app.models_page.alert.is_none());
    }

    #[test]
    fn theme_toggle_persists() {
        let mut h = Harness::new();
        h.keys(&[KeyCode::Char('T')]);
        assert_eq!(h.app.theme, Theme::Dark);
        assert_eq!(h.app.theme_store.load().unwrap(), Some(Theme::Dark));
        h.command("theme light");
        assert_eq!(h.app.theme_store.load().unwrap(), Some(Theme::Light));
    }

    #[test]
    fn command_history_and_completion() {
        let mut h = Harness::new();
        assert!(!h.command("help"));
        assert!(matches!(h.sent()[..], [AppCommand::Help]));

        h.keys(&[KeyCode::Char('/'), KeyCode::Up]);
        assert_eq!(h.app.command_input, "help");
        h.keys(&[KeyCode::Esc, KeyCode::Char('/'), KeyCode::Char('r'), KeyCode::Char('a')]);
        h.keys(&[KeyCode::Tab]);
        assert_eq!(h.app.command_input, "range ");
        h.keys(&[KeyCode::Esc]);

        assert!(h.command("quit"));
    }

    #[test]
    fn unknown_command_is_reported_by_actor() {
        let mut h = Harness::new();
        h.command("frobnicate");
        assert!(matches!(&h.sent()[..], [AppCommand::Unknown(msg)] if msg.contains("frobnicate")));
    }
}
