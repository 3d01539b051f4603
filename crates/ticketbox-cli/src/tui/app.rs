//! TUI application state and key handling.
//!
//! The app owns a [`Dispatcher`]; every key that changes data becomes a
//! [`Command`], and the table is rebuilt from storage after each dispatch.

use super::input::{LineInput, TextArea};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use ticketbox_core::clock::{Clock, SystemClock};
use ticketbox_core::command::{Command, Dispatcher, ExportDocument, Outcome, SortCommand};
use ticketbox_core::config::UiConfig;
use ticketbox_core::error::TicketError;
use ticketbox_core::feedback::Flash;
use ticketbox_core::model::{NewTicket, Ticket};
use ticketbox_core::sort::SortKey;
use ticketbox_core::storage::KeyValueStore;
use ticketbox_core::view::{DetailField, DetailForm, TicketRow, ViewState, build_rows_with};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The new ticket form has focus.
    NewTicket,
    /// A detail form is open for editing.
    Edit,
    /// A destructive command waits for a yes/no answer.
    Confirm,
    /// The import paste area is open.
    Import,
    /// The exported document is shown.
    Export,
    /// Help overlay is open.
    Help,
}

/// Which field of the new ticket form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewField {
    #[default]
    Subject,
    Text,
}

#[derive(Debug, Clone, Default)]
pub struct NewTicketForm {
    pub subject: LineInput,
    pub text: TextArea,
    pub focus: NewField,
}

impl NewTicketForm {
    fn values(&self) -> NewTicket {
        NewTicket::new(self.subject.value.clone(), self.text.text())
    }
}

/// A detail form being edited, with the snapshot it was opened from.
#[derive(Debug, Clone)]
pub struct EditState {
    pub snapshot: Ticket,
    pub form: DetailForm,
    pub subject: LineInput,
    pub text: TextArea,
}

impl EditState {
    fn open(ticket: &Ticket) -> Self {
        Self {
            snapshot: ticket.clone(),
            form: DetailForm::from_ticket(ticket),
            subject: LineInput::new(ticket.subject.clone()),
            text: TextArea::new(&ticket.text),
        }
    }

    fn sync(&mut self) {
        self.form.subject.clone_from(&self.subject.value);
        self.form.text = self.text.text();
    }
}

/// What a key press inside the detail form asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    None,
    Save,
    Cancel,
}

/// A destructive command held aside until the user answers.
#[derive(Debug, Clone)]
pub struct PendingCommand {
    pub command: Command,
    pub question: String,
}

pub struct App<S, C = SystemClock> {
    dispatcher: Dispatcher<S, C>,
    rows: Vec<TicketRow>,
    view: ViewState,
    selected: usize,
    mode: InputMode,
    form_hidden: bool,
    new_form: NewTicketForm,
    edit: Option<EditState>,
    pending: Option<PendingCommand>,
    import: TextArea,
    export: Option<String>,
    export_scroll: u16,
    help_query: String,
    flash: Option<Flash>,
    flash_ttl: Duration,
    date_format: String,
    should_quit: bool,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
    /// Load the tickets and open the detail row of `focus`, if given.
    ///
    /// # Errors
    ///
    /// Fails if the form toggle cannot be read from the store.
    pub fn new(
        dispatcher: Dispatcher<S, C>,
        ui: &UiConfig,
        focus: Option<&str>,
    ) -> Result<Self, TicketError> {
        let form_hidden = dispatcher.repository().form_hidden()?.unwrap_or(false);
        let mut app = Self {
            dispatcher,
            rows: Vec::new(),
            view: ViewState::new(),
            selected: 0,
            mode: InputMode::Normal,
            form_hidden,
            new_form: NewTicketForm::default(),
            edit: None,
            pending: None,
            import: TextArea::default(),
            export: None,
            export_scroll: 0,
            help_query: String::new(),
            flash: None,
            flash_ttl: ui.flash_ttl(),
            date_format: ui.date_format.clone(),
            should_quit: false,
        };
        app.reload();

        if let Some(uid) = focus {
            match app.view.toggle(&app.rows, uid) {
                Some(_) => app.select_uid(uid),
                None => app.set_flash(Flash::error(format!("ticket '{uid}' not found"))),
            }
        }
        Ok(app)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn rows(&self) -> &[TicketRow] {
        &self.rows
    }

    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    pub const fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&TicketRow> {
        self.rows.get(self.selected)
    }

    pub const fn form_hidden(&self) -> bool {
        self.form_hidden
    }

    pub const fn new_form(&self) -> &NewTicketForm {
        &self.new_form
    }

    pub const fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    pub const fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    pub const fn import_area(&self) -> &TextArea {
        &self.import
    }

    pub fn export_document(&self) -> Option<&str> {
        self.export.as_deref()
    }

    pub const fn export_scroll(&self) -> u16 {
        self.export_scroll
    }

    pub fn help_query(&self) -> &str {
        &self.help_query
    }

    pub const fn dispatcher(&self) -> &Dispatcher<S, C> {
        &self.dispatcher
    }

    /// The flash message, while it is still visible.
    pub fn visible_flash(&self) -> Option<&Flash> {
        self.flash()
            .filter(|flash| flash.is_visible(self.flash_ttl))
    }

    /// The latest flash message, visible or not.
    pub const fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_flash(&mut self, flash: Flash) {
        self.flash = Some(flash);
    }

    /// Drop a flash message once its time is up.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self
            .flash
            .as_ref()
            .is_some_and(|flash| !flash.is_visible_at(now, self.flash_ttl))
        {
            self.flash = None;
        }
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Rebuild every row from storage, keeping the selection on the same
    /// ticket where possible.
    fn reload(&mut self) {
        let selected_uid = self.selected_row().map(|row| row.uid().to_string());
        let tickets = match self.dispatcher.repository().load_all() {
            Ok(tickets) => tickets,
            Err(err) => {
                self.set_flash(Flash::error(err.to_string()));
                return;
            }
        };
        self.rows = build_rows_with(
            &tickets,
            &self.dispatcher.sort_setting(),
            &self.date_format,
        );
        self.view.retain(&self.rows);
        match selected_uid {
            Some(uid) => self.select_uid(&uid),
            None => self.clamp_selection(),
        }
    }

    fn select_uid(&mut self, uid: &str) {
        if let Some(idx) = self.rows.iter().position(|row| row.uid() == uid) {
            self.selected = idx;
        } else {
            self.clamp_selection();
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    /// Dispatch `command`, flash its outcome, and rebuild the rows.
    fn run(&mut self, command: Command) -> Option<Outcome> {
        let result = self.dispatcher.dispatch(command);
        self.reload();
        match result {
            Ok(outcome) => {
                if let Some(message) = outcome.message() {
                    self.set_flash(Flash::info(message));
                }
                Some(outcome)
            }
            Err(err) => {
                debug!(error = %err, "command failed");
                self.set_flash(Flash::error(err.to_string()));
                None
            }
        }
    }

    /// Hold `command` aside and ask the user about it.
    fn ask(&mut self, command: Command, question: String) {
        self.pending = Some(PendingCommand { command, question });
        self.mode = InputMode::Confirm;
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key, ctrl),
            InputMode::NewTicket => self.handle_new_ticket_key(key, ctrl),
            InputMode::Edit => self.handle_edit_key(key, ctrl),
            InputMode::Confirm => self.handle_confirm_key(key),
            InputMode::Import => self.handle_import_key(key, ctrl),
            InputMode::Export => self.handle_export_key(key),
            InputMode::Help => self.handle_help_key(key),
        }
    }

    /// Bracketed paste goes to whatever text input has focus.
    pub fn handle_paste(&mut self, text: &str) {
        match self.mode {
            InputMode::Import => self.import.insert_str(text),
            InputMode::NewTicket => match self.new_form.focus {
                NewField::Subject => self.new_form.subject.insert_str(text),
                NewField::Text => self.new_form.text.insert_str(text),
            },
            InputMode::Edit => {
                if let Some(edit) = self.edit.as_mut() {
                    match edit.form.focus {
                        DetailField::Subject => edit.subject.insert_str(text),
                        DetailField::Text => edit.text.insert_str(text),
                        DetailField::Priority | DetailField::State => {}
                    }
                    edit.sync();
                }
            }
            InputMode::Normal | InputMode::Confirm | InputMode::Export | InputMode::Help => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.rows.len().saturating_sub(1);
            }

            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') => self.open_edit(),
            KeyCode::Char('x') => self.ask_delete(),

            KeyCode::Char(c @ '1'..='3') => {
                let idx = usize::from(c as u8 - b'1');
                self.sort(SortCommand::Column(SortKey::COLUMNS[idx]));
            }
            KeyCode::Char('0') => self.sort(SortCommand::Reset),

            KeyCode::Char('n') => {
                if self.form_hidden {
                    self.set_flash(Flash::info("New ticket form is hidden, press H to show it"));
                } else {
                    self.mode = InputMode::NewTicket;
                }
            }
            KeyCode::Char('H') => self.toggle_form(),
            KeyCode::Char('I') => {
                self.import = TextArea::default();
                self.mode = InputMode::Import;
            }
            KeyCode::Char('E') => self.export(),
            KeyCode::Char('C') => {
                let command = Command::Clear;
                let question = command.confirmation().unwrap_or_default().to_string();
                self.ask(command, question);
            }
            KeyCode::Char('?') => {
                self.help_query.clear();
                self.mode = InputMode::Help;
            }
            _ => {}
        }
    }

    fn toggle_selected(&mut self) {
        let Some(uid) = self.selected_row().map(|row| row.uid().to_string()) else {
            return;
        };
        if self.view.toggle(&self.rows, &uid) == Some(false)
            && self.edit.as_ref().is_some_and(|edit| edit.snapshot.uid == uid)
        {
            self.edit = None;
        }
    }

    fn open_edit(&mut self) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let uid = row.uid().to_string();
        self.edit = Some(EditState::open(&row.ticket));
        if !self.view.is_expanded(&uid) {
            self.view.toggle(&self.rows, &uid);
        }
        self.mode = InputMode::Edit;
    }

    fn ask_delete(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let command = Command::Delete {
            uid: row.uid().to_string(),
        };
        let question = format!(
            "Delete '{}'? {}",
            row.ticket.subject,
            command.confirmation().unwrap_or_default()
        );
        self.ask(command, question);
    }

    fn sort(&mut self, sort: SortCommand) {
        if let Some(Outcome::Sorted(setting)) = self.run(Command::Sort(sort)) {
            self.set_flash(Flash::info(format!("Sort: {}", setting.label())));
        }
    }

    fn toggle_form(&mut self) {
        if let Some(Outcome::FormToggled { hidden }) = self.run(Command::ToggleForm) {
            self.form_hidden = hidden;
            let state = if hidden { "hidden" } else { "shown" };
            self.set_flash(Flash::info(format!("New ticket form {state}")));
        }
    }

    fn export(&mut self) {
        if let Some(Outcome::Exported { json, .. }) = self.run(Command::Export) {
            let document = ExportDocument::parse(&json)
                .and_then(|doc| doc.to_json_pretty())
                .unwrap_or(json);
            self.export = Some(document);
            self.export_scroll = 0;
            self.mode = InputMode::Export;
        }
    }

    fn handle_new_ticket_key(&mut self, key: KeyEvent, ctrl: bool) {
        let focus = self.new_form.focus;
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Char('s') if ctrl => self.submit_new_ticket(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.new_form.focus = match focus {
                    NewField::Subject => NewField::Text,
                    NewField::Text => NewField::Subject,
                };
            }
            KeyCode::Enter if focus == NewField::Subject => self.submit_new_ticket(),
            _ => match focus {
                NewField::Subject => self.new_form.subject.handle_key(key),
                NewField::Text => self.new_form.text.handle_key(key),
            },
        }
    }

    fn submit_new_ticket(&mut self) {
        let values = self.new_form.values();
        if let Some(Outcome::Created(ticket)) = self.run(Command::Create(values)) {
            self.new_form = NewTicketForm::default();
            self.select_uid(&ticket.uid);
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Some(edit) = self.edit.as_mut() else {
            self.mode = InputMode::Normal;
            return;
        };
        let action = match key.code {
            KeyCode::Esc => EditAction::Cancel,
            KeyCode::Char('s') if ctrl => EditAction::Save,
            KeyCode::Tab => {
                edit.form.focus = edit.form.focus.next();
                EditAction::None
            }
            KeyCode::BackTab => {
                edit.form.focus = edit.form.focus.prev();
                EditAction::None
            }
            _ => match edit.form.focus {
                DetailField::Subject if key.code == KeyCode::Enter => EditAction::Save,
                DetailField::Subject => {
                    edit.subject.handle_key(key);
                    EditAction::None
                }
                DetailField::Text => {
                    edit.text.handle_key(key);
                    EditAction::None
                }
                DetailField::Priority => {
                    if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                        edit.form.priority = !edit.form.priority;
                    }
                    EditAction::None
                }
                DetailField::State => {
                    match key.code {
                        KeyCode::Right | KeyCode::Char(' ' | 'l') | KeyCode::Enter => {
                            edit.form.state = edit.form.state.next();
                        }
                        KeyCode::Left | KeyCode::Char('h') => {
                            edit.form.state = edit.form.state.prev();
                        }
                        _ => {}
                    }
                    EditAction::None
                }
            },
        };
        edit.sync();

        match action {
            EditAction::None => {}
            EditAction::Cancel => {
                self.edit = None;
                self.mode = InputMode::Normal;
            }
            EditAction::Save => self.save_edit(),
        }
    }

    fn save_edit(&mut self) {
        let Some(edit) = self.edit.as_ref() else {
            return;
        };
        // Invalid input keeps the form open so it can be fixed.
        let changes = match edit.form.save() {
            Ok(changes) => changes,
            Err(err) => {
                self.set_flash(Flash::error(err.to_string()));
                return;
            }
        };
        let command = Command::Update {
            ticket: edit.snapshot.clone(),
            edit: changes,
        };
        if self.run(command).is_some() {
            self.edit = None;
            self.mode = InputMode::Normal;
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                self.mode = InputMode::Normal;
                if let Some(pending) = self.pending.take() {
                    self.run(pending.command);
                }
            }
            KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => {
                self.pending = None;
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_import_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Char('s') if ctrl => {
                let command = Command::Import {
                    json: self.import.text(),
                };
                let question = command.confirmation().unwrap_or_default().to_string();
                self.ask(command, question);
            }
            _ => self.import.handle_key(key),
        }
    }

    fn handle_export_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q' | 'E') => {
                self.export = None;
                self.mode = InputMode::Normal;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.export_scroll = self.export_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.export_scroll = self.export_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.help_query.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.help_query.pop();
            }
            KeyCode::Char(c) => self.help_query.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ticketbox_core::clock::ManualClock;
    use ticketbox_core::feedback::FlashKind;
    use ticketbox_core::model::State;
    use ticketbox_core::repository::TicketRepository;
    use ticketbox_core::sort::SortSetting;
    use ticketbox_core::storage::MemoryStore;

    type TestApp = App<MemoryStore, ManualClock>;

    fn dispatcher() -> Dispatcher<MemoryStore, ManualClock> {
        Dispatcher::new(TicketRepository::with_parts(
            MemoryStore::new(),
            ManualClock::new(1_000),
            StdRng::seed_from_u64(5),
        ))
    }

    fn app() -> TestApp {
        App::new(dispatcher(), &UiConfig::default(), None).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn press(app: &mut TestApp, code: KeyCode) {
        app.handle_key(key(code));
    }

    fn type_str(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn add(app: &mut TestApp, subject: &str) {
        press(app, KeyCode::Char('n'));
        type_str(app, subject);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Esc);
    }

    fn flash_text(app: &TestApp) -> Option<(&str, FlashKind)> {
        app.flash().map(|f| (f.message.as_str(), f.kind))
    }

    fn subjects(app: &TestApp) -> Vec<&str> {
        app.rows()
            .iter()
            .map(|row| row.ticket.subject.as_str())
            .collect()
    }

    #[test]
    fn new_ticket_form_adds_a_ticket() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), InputMode::NewTicket);
        type_str(&mut app, "Fix bug");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "steps");
        app.handle_key(ctrl('s'));

        assert_eq!(subjects(&app), vec!["Fix bug"]);
        assert_eq!(app.rows()[0].ticket.text, "steps");
        assert_eq!(app.rows()[0].ticket.state, State::New);
        assert_eq!(flash_text(&app), Some(("Ticket added", FlashKind::Info)));
        assert_eq!(app.new_form().subject.value, "");
        assert_eq!(app.mode(), InputMode::NewTicket);
    }

    #[test]
    fn empty_subject_is_rejected_with_a_flash() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert!(app.rows().is_empty());
        assert_eq!(flash_text(&app), Some(("No subject given", FlashKind::Error)));
    }

    #[test]
    fn enter_expands_rows_independently() {
        let mut app = app();
        add(&mut app, "A");
        add(&mut app, "B");
        let first = app.rows()[0].uid().to_string();
        let second = app.rows()[1].uid().to_string();

        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.view().is_expanded(&first));
        assert!(app.view().is_expanded(&second));
        assert_eq!(app.view().fragment(), Some(second.as_str()));

        press(&mut app, KeyCode::Enter);
        assert!(!app.view().is_expanded(&second));
        assert_eq!(app.view().fragment(), None);
        assert!(app.view().is_expanded(&first));
    }

    #[test]
    fn focus_expands_the_named_ticket() {
        let mut d = dispatcher();
        let Outcome::Created(ticket) = d
            .dispatch(Command::Create(NewTicket::new("Focus me", "")))
            .unwrap()
        else {
            panic!("expected Created");
        };
        let app: TestApp = App::new(d, &UiConfig::default(), Some(&ticket.uid)).unwrap();
        assert_eq!(app.view().fragment(), Some(ticket.uid.as_str()));
        assert_eq!(app.selected_row().unwrap().uid(), ticket.uid);
    }

    #[test]
    fn unknown_focus_flashes_an_error() {
        let app: TestApp = App::new(dispatcher(), &UiConfig::default(), Some("zzz999")).unwrap();
        assert_eq!(app.view().fragment(), None);
        assert_eq!(flash_text(&app).map(|(_, kind)| kind), Some(FlashKind::Error));
    }

    #[test]
    fn number_keys_toggle_sort_columns() {
        let mut app = app();
        add(&mut app, "Banana");
        add(&mut app, "Apple");
        press(&mut app, KeyCode::Esc);
        assert_eq!(subjects(&app).len(), 2);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(subjects(&app), vec!["Apple", "Banana"]);
        assert_eq!(
            app.dispatcher().sort_setting(),
            SortSetting::by(SortKey::Subject, true)
        );

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(subjects(&app), vec!["Banana", "Apple"]);

        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.dispatcher().sort_setting(), SortSetting::unsorted());
    }

    #[test]
    fn declining_delete_keeps_the_ticket() {
        let mut app = app();
        add(&mut app, "Keep me");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode(), InputMode::Confirm);
        assert_eq!(
            app.pending().unwrap().question,
            "Delete 'Keep me'? Are you sure?"
        );
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.pending().is_none());
        assert_eq!(subjects(&app), vec!["Keep me"]);
    }

    #[test]
    fn confirming_delete_removes_the_ticket() {
        let mut app = app();
        add(&mut app, "Drop me");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.rows().is_empty());
        assert_eq!(flash_text(&app), Some(("Ticket removed", FlashKind::Info)));
    }

    #[test]
    fn edit_form_saves_changes() {
        let mut app = app();
        add(&mut app, "Fix bug");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode(), InputMode::Edit);
        assert!(app.view().is_expanded(app.rows()[0].uid()));

        type_str(&mut app, " v2");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "b");
        assert_eq!(app.edit_state().unwrap().form.text_height(), 2);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        app.handle_key(ctrl('s'));

        let ticket = &app.rows()[0].ticket;
        assert_eq!(ticket.subject, "Fix bug v2");
        assert_eq!(ticket.text, "a\nb");
        assert!(ticket.priority);
        assert_eq!(ticket.state, State::InProgress);
        assert_eq!(app.mode(), InputMode::Normal);
        assert_eq!(flash_text(&app), Some(("Ticket updated", FlashKind::Info)));
    }

    #[test]
    fn edit_with_empty_subject_keeps_form_open() {
        let mut app = app();
        add(&mut app, "Fix");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('e'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode(), InputMode::Edit);
        assert_eq!(flash_text(&app), Some(("No subject given", FlashKind::Error)));
        assert_eq!(app.rows()[0].ticket.subject, "Fix");
    }

    #[test]
    fn escape_cancels_edit_without_saving() {
        let mut app = app();
        add(&mut app, "Fix");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "ed");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.edit_state().is_none());
        assert_eq!(app.rows()[0].ticket.subject, "Fix");
    }

    #[test]
    fn hiding_the_form_is_persisted() {
        let mut app = app();
        press(&mut app, KeyCode::Char('H'));
        assert!(app.form_hidden());
        assert_eq!(
            app.dispatcher().repository().form_hidden().unwrap(),
            Some(true)
        );
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), InputMode::Normal);
        press(&mut app, KeyCode::Char('H'));
        assert!(!app.form_hidden());
    }

    #[test]
    fn malformed_import_keeps_tickets() {
        let mut app = app();
        add(&mut app, "Survivor");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('I'));
        app.handle_paste("{not json");
        app.handle_key(ctrl('s'));
        assert_eq!(
            app.pending().unwrap().question,
            "Current data will be lost! Import anyway?"
        );
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(subjects(&app), vec!["Survivor"]);
        let (message, kind) = flash_text(&app).unwrap();
        assert_eq!(kind, FlashKind::Error);
        assert!(message.starts_with("import failed"));
    }

    #[test]
    fn export_then_import_restores_tickets() {
        let mut app = app();
        add(&mut app, "One");
        add(&mut app, "Two");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('E'));
        assert_eq!(app.mode(), InputMode::Export);
        let document = app.export_document().unwrap().to_string();
        assert!(document.contains("\"tickets\""));
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.rows().is_empty());
        assert_eq!(flash_text(&app), Some(("Tickets cleared", FlashKind::Info)));

        press(&mut app, KeyCode::Char('I'));
        app.handle_paste(&document);
        app.handle_key(ctrl('s'));
        press(&mut app, KeyCode::Enter);
        let mut restored = subjects(&app);
        restored.sort_unstable();
        assert_eq!(restored, vec!["One", "Two"]);
        assert_eq!(flash_text(&app), Some(("Tickets imported", FlashKind::Info)));
    }

    #[test]
    fn collapsed_rows_are_forgotten_after_delete() {
        let mut app = app();
        add(&mut app, "Gone");
        press(&mut app, KeyCode::Esc);
        let uid = app.rows()[0].uid().to_string();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.view().is_expanded(&uid));
        assert_eq!(app.view().fragment(), None);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected(), 0);
        add(&mut app, "A");
        add(&mut app, "B");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('G'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected(), 1);
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected(), 0);
    }

    #[test]
    fn help_overlay_filters_and_closes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.mode(), InputMode::Help);
        type_str(&mut app, "sort");
        assert_eq!(app.help_query(), "sort");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), InputMode::Normal);
        assert_eq!(app.help_query(), "");
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
