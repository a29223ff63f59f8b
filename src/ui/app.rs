use std::future::Future;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::console::{Completion, QueryConsole};
use crate::db::{ConsoleTarget, QueryExecutor};
use crate::error;
use crate::lifecycle::{Created, DraftRejected, EngineFilter, InstanceOrchestrator, PendingDeletion, RotationDialog, StatsAudit};
use crate::ui::components::{
    console::render_console, dialogs, ConsoleFocus, CreateForm, Input, InstanceList, Notice, StatusBar,
};

/// Results of spawned work, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    Loaded(error::Result<()>),
    Created { ticket: u64, outcome: std::result::Result<Created, DraftRejected> },
    Deleted { name: String, outcome: error::Result<()> },
    Rotated { id: i64, outcome: error::Result<()> },
    Resized(error::Result<()>),
    Audited(error::Result<StatsAudit>),
    Console(Completion),
}

struct ConsoleSession {
    console: QueryConsole,
    editor: Input,
    focus: ConsoleFocus,
}

struct ResizeForm {
    id: i64,
    name: String,
    input: Input,
    error: Option<String>,
}

enum Mode {
    Browse,
    Search,
    Create(CreateForm),
    ConfirmDelete(PendingDeletion),
    Rotate { dialog: RotationDialog, reveal: bool },
    Resize(ResizeForm),
    Console(ConsoleSession),
}

pub struct App {
    orchestrator: Arc<InstanceOrchestrator>,
    executor: Arc<dyn QueryExecutor>,
    query_timeout: Option<Duration>,

    // UI 组件
    list: InstanceList,
    status_bar: StatusBar,
    search: Input,

    // 状态
    filter: EngineFilter,
    mode: Mode,
    in_flight: usize,
    // 每次提交创建请求递增，用来认领对应的对话框
    next_ticket: u64,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(
        orchestrator: Arc<InstanceOrchestrator>,
        executor: Arc<dyn QueryExecutor>,
        query_timeout: Option<Duration>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status_bar = StatusBar::new(executor.name());
        Self {
            orchestrator,
            executor,
            query_timeout,
            list: InstanceList::new(),
            status_bar,
            search: Input::new(),
            filter: EngineFilter::All,
            mode: Mode::Browse,
            in_flight: 0,
            next_ticket: 0,
            tx,
            rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // 设置信号处理
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();

        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })?;

        // 设置终端
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.status_bar.notify(Notice::info("Loading databases..."));
        self.reload();

        let result = self.run_app(&mut terminal, running).await;

        // 无论成功还是失败，都要恢复终端状态
        self.safe_cleanup_terminal(&mut terminal);
        info!("ui closed");

        result
    }

    fn safe_cleanup_terminal<B: Backend + io::Write>(&self, terminal: &mut Terminal<B>) {
        let _ = ratatui::backend::Backend::flush(terminal.backend_mut());
        let _ = terminal.show_cursor();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
    }

    async fn run_app<B: Backend + io::Write>(&mut self, terminal: &mut Terminal<B>, running: Arc<AtomicBool>) -> Result<()> {
        loop {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            self.drain_events();
            terminal.draw(|f| self.ui(f))?;

            // 轮询而不是阻塞读取，后台任务的结果才能及时显示
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key_event(key) {
                        break;
                    }
                }
            }
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        self.in_flight += 1;
        self.status_bar.set_in_flight(self.in_flight);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // 接收端已关闭说明界面退出了，结果直接丢弃
            let _ = tx.send(work.await);
        });
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply_event(event);
        }
        self.status_bar.set_in_flight(self.in_flight);
    }

    fn refresh_view(&mut self) {
        self.list.set_view(self.orchestrator.filter(self.search.value(), self.filter));
        self.status_bar.set_stats(self.orchestrator.stats());
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded(Ok(())) => {
                self.refresh_view();
                self.status_bar.notify(Notice::info("Databases loaded"));
            }
            AppEvent::Loaded(Err(e)) => self.status_bar.notify(Notice::error(e.to_string())),
            AppEvent::Created { ticket, outcome } => {
                let own_form = matches!(&self.mode, Mode::Create(form) if form.submission == Some(ticket));
                match outcome {
                    Ok(created) => {
                        if own_form {
                            self.mode = Mode::Browse;
                        }
                        let notice = match created {
                            Created::Reloaded => Notice::success("Database created"),
                            Created::ReloadFailed(e) => {
                                Notice::error(format!("Database created, but reload failed: {}", e))
                            }
                        };
                        self.status_bar.notify(notice);
                        self.refresh_view();
                    }
                    Err(DraftRejected { draft, error }) => match &mut self.mode {
                        Mode::Create(form) if own_form => {
                            form.draft = draft;
                            form.submission = None;
                            form.error = Some(error.to_string());
                        }
                        _ => self
                            .status_bar
                            .notify(Notice::error(format!("Failed to create \"{}\": {}", draft.name, error))),
                    },
                }
            }
            AppEvent::Deleted { name, outcome } => match outcome {
                Ok(()) => {
                    self.status_bar.notify(Notice::success(format!("Database \"{}\" deleted", name)));
                    self.refresh_view();
                }
                Err(e) => self.status_bar.notify(Notice::error(e.to_string())),
            },
            AppEvent::Rotated { id, outcome } => {
                let name = self.orchestrator.get(id).map(|db| db.name).unwrap_or_else(|| format!("#{}", id));
                let notice = match &outcome {
                    Ok(()) => Notice::success(format!("Password changed for \"{}\"", name)),
                    Err(e) => Notice::error(format!("Password change for \"{}\" failed: {}", name, e)),
                };
                // 只认领发起这次请求的对话框
                if let Mode::Rotate { dialog, .. } = &mut self.mode {
                    if dialog.target_id == id && dialog.is_submitting() {
                        dialog.finish(outcome);
                        if !dialog.is_open() {
                            self.mode = Mode::Browse;
                        }
                    }
                }
                self.status_bar.notify(notice);
            }
            AppEvent::Resized(outcome) => match outcome {
                Ok(()) => {
                    if matches!(self.mode, Mode::Resize(_)) {
                        self.mode = Mode::Browse;
                    }
                    self.status_bar.notify(Notice::success("Size limit updated"));
                    self.refresh_view();
                }
                Err(e) => {
                    if let Mode::Resize(form) = &mut self.mode {
                        form.error = Some(e.to_string());
                    } else {
                        self.status_bar.notify(Notice::error(e.to_string()));
                    }
                }
            },
            AppEvent::Audited(Ok(audit)) => {
                let notice = if audit.consistent() {
                    Notice::info(format!("Stats consistent with server: {} databases", audit.local.total_databases))
                } else {
                    Notice::error(format!(
                        "Stats mismatch: local {} / server {} databases",
                        audit.local.total_databases, audit.remote.total_databases
                    ))
                };
                self.status_bar.notify(notice);
            }
            AppEvent::Audited(Err(e)) => self.status_bar.notify(Notice::error(e.to_string())),
            AppEvent::Console(completion) => {
                let applied = match &mut self.mode {
                    Mode::Console(session) => session.console.complete(completion),
                    _ => false,
                };
                if !applied {
                    debug!("console result arrived after the console closed");
                }
            }
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // 状态栏
                Constraint::Min(0),    // 数据库列表
                Constraint::Length(3), // 搜索栏
            ])
            .split(f.area());

        self.status_bar.render(f, chunks[0]);
        self.list.render(f, chunks[1], self.search.value(), self.filter);
        self.search.render(f, chunks[2], "Search (/)  n new  d delete  p password  s size  i audit  f engine  Enter console  q quit", matches!(self.mode, Mode::Search));

        let area = f.area();
        match &self.mode {
            Mode::Browse | Mode::Search => {}
            Mode::Create(form) => dialogs::render_create(f, area, form),
            Mode::ConfirmDelete(pending) => dialogs::render_confirm_delete(f, area, pending),
            Mode::Rotate { dialog, reveal } => dialogs::render_rotate(f, area, dialog, *reveal),
            Mode::Resize(form) => dialogs::render_resize(f, area, &form.name, &form.input, &form.error),
            Mode::Console(session) => {
                let area = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(0)])
                    .split(area)[1];
                render_console(f, area, &session.console, &session.editor, session.focus);
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.mode {
            Mode::Browse => return self.handle_browse_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::Create(_) => self.handle_create_key(key, ctrl),
            Mode::ConfirmDelete(_) => self.handle_confirm_key(key),
            Mode::Rotate { .. } => self.handle_rotate_key(key, ctrl),
            Mode::Resize(_) => self.handle_resize_key(key),
            Mode::Console(_) => self.handle_console_key(key, ctrl),
        }
        false
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.list.next_item(),
            KeyCode::Up | KeyCode::Char('k') => self.list.previous_item(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('n') => self.mode = Mode::Create(CreateForm::new()),
            KeyCode::Char('d') => self.prepare_delete(),
            KeyCode::Char('p') => {
                if let Some(db) = self.list.selected() {
                    self.mode = Mode::Rotate { dialog: RotationDialog::open(db), reveal: false };
                }
            }
            KeyCode::Char('s') => {
                if let Some(db) = self.list.selected() {
                    self.mode = Mode::Resize(ResizeForm {
                        id: db.id,
                        name: db.name.clone(),
                        input: Input::with_value(&db.effective_max_mb().to_string()),
                        error: None,
                    });
                }
            }
            KeyCode::Char('i') => {
                let orch = self.orchestrator.clone();
                self.spawn(async move { AppEvent::Audited(orch.audit_stats().await) });
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('f') => {
                self.filter = self.filter.cycle();
                self.refresh_view();
            }
            KeyCode::Enter | KeyCode::Char('c') => self.open_console(),
            KeyCode::Esc => {
                self.search.clear();
                self.refresh_view();
            }
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Backspace => self.search.delete_char(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Char(c) => self.search.add_char(c),
            _ => return,
        }
        self.refresh_view();
    }

    fn reload(&mut self) {
        let orch = self.orchestrator.clone();
        self.spawn(async move { AppEvent::Loaded(orch.load().await) });
    }

    fn prepare_delete(&mut self) {
        let Some(id) = self.list.selected().map(|db| db.id) else { return };
        match self.orchestrator.prepare_delete(id) {
            Ok(pending) => self.mode = Mode::ConfirmDelete(pending),
            Err(e) => self.status_bar.notify(Notice::error(e.to_string())),
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Mode::ConfirmDelete(pending) = std::mem::replace(&mut self.mode, Mode::Browse) {
                    let confirmed = pending.confirm();
                    let name = confirmed.name().to_string();
                    let orch = self.orchestrator.clone();
                    self.spawn(async move {
                        let outcome = orch.delete(confirmed).await;
                        AppEvent::Deleted { name, outcome }
                    });
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Browse,
            _ => {}
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Mode::Create(form) = &mut self.mode else { return };
        if form.is_submitting() {
            // 请求进行中只允许关闭对话框
            if key.code == KeyCode::Esc {
                self.mode = Mode::Browse;
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Tab => form.next_field(),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Char('g') if ctrl => form.generate_password(),
            KeyCode::Enter => self.submit_create(),
            KeyCode::Char(c) if !ctrl => form.add_char(c),
            _ => {}
        }
    }

    fn submit_create(&mut self) {
        let Mode::Create(form) = &mut self.mode else { return };
        if let Err(e) = form.draft.validate() {
            form.error = Some(e.to_string());
            return;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        form.submission = Some(ticket);
        form.error = None;
        let draft = form.take_draft();
        let orch = self.orchestrator.clone();
        self.spawn(async move {
            let outcome = orch.create(draft).await;
            AppEvent::Created { ticket, outcome }
        });
    }

    fn handle_rotate_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Mode::Rotate { dialog, reveal } = &mut self.mode else { return };
        match key.code {
            KeyCode::Esc => {
                dialog.close();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => {
                if let Ok((id, password)) = dialog.begin_submit() {
                    let orch = self.orchestrator.clone();
                    self.spawn(async move {
                        let outcome = orch.rotate_credential(id, password).await;
                        AppEvent::Rotated { id, outcome }
                    });
                }
            }
            _ if dialog.is_submitting() => {}
            KeyCode::Backspace => dialog.password.pop(),
            KeyCode::Char('g') if ctrl => {
                dialog.generate();
                *reveal = true;
            }
            KeyCode::Char(c) if !ctrl => dialog.password.push(c),
            _ => {}
        }
    }

    fn handle_resize_key(&mut self, key: KeyEvent) {
        let Mode::Resize(form) = &mut self.mode else { return };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Backspace => form.input.delete_char(),
            KeyCode::Char(c) if c.is_ascii_digit() => form.input.add_char(c),
            KeyCode::Enter => match form.input.value().trim().parse::<u32>() {
                Ok(max_size_mb) => {
                    form.error = None;
                    let id = form.id;
                    let orch = self.orchestrator.clone();
                    self.spawn(async move { AppEvent::Resized(orch.resize(id, max_size_mb).await) });
                }
                Err(_) => form.error = Some("Size limit must be a whole number of MB".to_string()),
            },
            _ => {}
        }
    }

    fn open_console(&mut self) {
        let Some(db) = self.list.selected() else { return };
        let console = QueryConsole::open(ConsoleTarget::from(db), self.executor.clone(), self.query_timeout);
        let focus = if console.requires_password() { ConsoleFocus::Password } else { ConsoleFocus::Query };
        let editor = Input::with_value(&console.query);
        self.mode = Mode::Console(ConsoleSession { console, editor, focus });
    }

    fn handle_console_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Mode::Console(session) = &mut self.mode else { return };
        match key.code {
            // 关闭即丢弃会话，未完成请求的结果会被忽略
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::F(5) => self.run_console(false),
            KeyCode::Char('r') if ctrl => self.run_console(false),
            KeyCode::Char('s') if ctrl => self.run_console(true),
            KeyCode::Char('l') if ctrl => {
                session.console.clear();
                session.editor.clear();
            }
            KeyCode::Tab => session.focus = session.focus.toggle(),
            KeyCode::Enter if session.focus == ConsoleFocus::Password => self.run_console(false),
            _ => match session.focus {
                ConsoleFocus::Query => {
                    match key.code {
                        KeyCode::Up => {
                            if let Some(prev) = session.editor.get_history_up() {
                                session.editor.set_value(&prev);
                            }
                        }
                        KeyCode::Down => {
                            let next = session.editor.get_history_down().unwrap_or_default();
                            session.editor.set_value(&next);
                        }
                        KeyCode::Left => session.editor.move_cursor_left(),
                        KeyCode::Right => session.editor.move_cursor_right(),
                        KeyCode::Backspace => session.editor.delete_char(),
                        KeyCode::Char(c) if !ctrl => session.editor.add_char(c),
                        _ => return,
                    }
                    session.console.set_query(session.editor.value());
                }
                ConsoleFocus::Password => match key.code {
                    KeyCode::Backspace => session.console.password.pop(),
                    KeyCode::Char(c) if !ctrl => session.console.password.push(c),
                    _ => {}
                },
            },
        }
    }

    fn run_console(&mut self, schema: bool) {
        let Mode::Console(session) = &mut self.mode else { return };
        let pending = if schema { session.console.begin_schema() } else { session.console.begin_run() };
        match pending {
            Ok(Some(pending)) => {
                if !schema {
                    session.editor.add_to_history(session.console.query.clone());
                }
                self.spawn(async move { AppEvent::Console(pending.execute().await) });
            }
            Ok(None) => debug!("console busy, run ignored"),
            Err(e) => debug!(error = %e, "console run rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsolePhase;
    use crate::db::QuerySimulator;
    use crate::error::DeckError;
    use crate::lifecycle::tests::FakeApi;
    use crate::models::instance::sample;
    use crate::models::EngineKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_and_api(instances: Vec<crate::models::DatabaseInstance>) -> (Arc<FakeApi>, App) {
        let api = FakeApi::with(instances);
        let orchestrator = Arc::new(InstanceOrchestrator::new(api.clone()));
        let executor: Arc<dyn QueryExecutor> = Arc::new(QuerySimulator::new(Duration::ZERO));
        (api, App::new(orchestrator, executor, None))
    }

    fn app_with(instances: Vec<crate::models::DatabaseInstance>) -> App {
        app_and_api(instances).1
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(press(KeyCode::Char(c)));
        }
    }

    // 填好表单并提交，然后关掉对话框再开一个新的
    fn submit_create_then_reopen(app: &mut App) {
        app.handle_key_event(press(KeyCode::Char('n')));
        type_text(app, "shop");
        app.handle_key_event(press(KeyCode::Tab));
        type_text(app, "admin");
        app.handle_key_event(press(KeyCode::Tab));
        type_text(app, "pw");
        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.in_flight, 1);
        app.handle_key_event(press(KeyCode::Esc));
        app.handle_key_event(press(KeyCode::Char('n')));
        type_text(app, "x");
    }

    async fn settle(app: &mut App) {
        while app.in_flight > 0 {
            if let Some(event) = app.rx.recv().await {
                app.in_flight -= 1;
                app.apply_event(event);
            }
        }
    }

    #[tokio::test]
    async fn test_reload_then_console_round_trip() {
        let mut app = app_with(vec![sample(1, "shop", EngineKind::Mysql, 10.0)]);
        app.reload();
        settle(&mut app).await;
        assert_eq!(app.list.selected().map(|db| db.id), Some(1));

        app.handle_key_event(press(KeyCode::Enter));
        assert!(matches!(app.mode, Mode::Console(_)));
        app.handle_key_event(press(KeyCode::F(5)));
        settle(&mut app).await;

        let Mode::Console(session) = &app.mode else { panic!("console closed") };
        assert_eq!(session.console.phase(), ConsolePhase::Succeeded);
        assert_eq!(session.console.result().map(|r| r.row_count()), Some(5));
    }

    #[tokio::test]
    async fn test_closed_console_drops_late_result() {
        let mut app = app_with(vec![sample(1, "shop", EngineKind::Mysql, 10.0)]);
        app.reload();
        settle(&mut app).await;

        app.handle_key_event(press(KeyCode::Enter));
        app.handle_key_event(press(KeyCode::F(5)));
        app.handle_key_event(press(KeyCode::Esc));
        settle(&mut app).await;
        assert!(matches!(app.mode, Mode::Browse));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = app_with(vec![
            sample(1, "shop", EngineKind::Mysql, 10.0),
            sample(2, "blog", EngineKind::Postgresql, 5.0),
        ]);
        app.reload();
        settle(&mut app).await;

        app.handle_key_event(press(KeyCode::Char('d')));
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key_event(press(KeyCode::Char('n')));
        assert!(matches!(app.mode, Mode::Browse));
        assert_eq!(app.in_flight, 0);

        app.handle_key_event(press(KeyCode::Char('d')));
        app.handle_key_event(press(KeyCode::Char('y')));
        settle(&mut app).await;
        assert_eq!(app.orchestrator.snapshot().instances.len(), 1);
        assert_eq!(app.status_bar.notice().map(|n| n.message.as_str()), Some("Database \"shop\" deleted"));
    }

    #[tokio::test]
    async fn test_create_validation_keeps_dialog_open() {
        let mut app = app_with(Vec::new());
        app.handle_key_event(press(KeyCode::Char('n')));
        app.handle_key_event(press(KeyCode::Enter));
        let Mode::Create(form) = &app.mode else { panic!("dialog closed") };
        assert_eq!(form.error.as_deref(), Some("Please fill in all fields"));
        assert_eq!(app.in_flight, 0);
    }

    #[tokio::test]
    async fn test_search_filters_list() {
        let mut app = app_with(vec![
            sample(1, "shop", EngineKind::Mysql, 10.0),
            sample(2, "blog", EngineKind::Postgresql, 5.0),
        ]);
        app.reload();
        settle(&mut app).await;

        app.handle_key_event(press(KeyCode::Char('/')));
        for c in "blo".chars() {
            app.handle_key_event(press(KeyCode::Char(c)));
        }
        assert_eq!(app.list.selected().map(|db| db.id), Some(2));
    }

    #[tokio::test]
    async fn test_rotation_result_only_finishes_its_own_dialog() {
        let mut app = app_with(vec![
            sample(1, "shop", EngineKind::Mysql, 10.0),
            sample(2, "blog", EngineKind::Postgresql, 5.0),
        ]);
        app.reload();
        settle(&mut app).await;

        app.handle_key_event(press(KeyCode::Char('p')));
        type_text(&mut app, "pw1");
        app.handle_key_event(press(KeyCode::Enter));
        app.handle_key_event(press(KeyCode::Esc));
        app.handle_key_event(press(KeyCode::Down));
        app.handle_key_event(press(KeyCode::Char('p')));
        type_text(&mut app, "x");
        settle(&mut app).await;

        let Mode::Rotate { dialog, .. } = &app.mode else { panic!("dialog closed") };
        assert_eq!(dialog.target_id, 2);
        assert!(dialog.is_open());
        assert!(!dialog.is_submitting());
        assert_eq!(dialog.password.expose(), "x");
        assert!(dialog.error.is_none());
        assert_eq!(
            app.status_bar.notice().map(|n| n.message.as_str()),
            Some("Password changed for \"shop\"")
        );
    }

    #[tokio::test]
    async fn test_rejected_create_leaves_new_draft_alone() {
        let (api, mut app) = app_and_api(Vec::new());
        api.fail(DeckError::Server("name already taken".into()));

        submit_create_then_reopen(&mut app);
        settle(&mut app).await;

        let Mode::Create(form) = &app.mode else { panic!("dialog closed") };
        assert_eq!(form.draft.name, "x");
        assert!(form.error.is_none());
        assert!(!form.is_submitting());
        assert_eq!(
            app.status_bar.notice().map(|n| n.message.as_str()),
            Some("Failed to create \"shop\": name already taken")
        );
    }

    #[tokio::test]
    async fn test_earlier_create_does_not_close_new_dialog() {
        let (_, mut app) = app_and_api(Vec::new());

        submit_create_then_reopen(&mut app);
        settle(&mut app).await;

        let Mode::Create(form) = &app.mode else { panic!("dialog closed") };
        assert_eq!(form.draft.name, "x");
        assert_eq!(app.status_bar.notice().map(|n| n.message.as_str()), Some("Database created"));
        assert_eq!(app.orchestrator.snapshot().instances.len(), 1);
    }

    #[tokio::test]
    async fn test_create_result_closes_its_own_dialog() {
        let (_, mut app) = app_and_api(Vec::new());
        app.handle_key_event(press(KeyCode::Char('n')));
        type_text(&mut app, "shop");
        app.handle_key_event(press(KeyCode::Tab));
        type_text(&mut app, "admin");
        app.handle_key_event(press(KeyCode::Tab));
        type_text(&mut app, "pw");
        app.handle_key_event(press(KeyCode::Enter));
        settle(&mut app).await;
        assert!(matches!(app.mode, Mode::Browse));
        assert_eq!(app.list.selected().map(|db| db.name.as_str()), Some("shop"));
    }
}
