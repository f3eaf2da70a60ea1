//! Unit tests for the window shell over the headless engine.

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use driftwood::app::App;
use driftwood::engine::headless::{calls_for, HeadlessFactory, SharedLog, ViewCall};
use driftwood::engine::{EngineEvent, EngineView};
use driftwood::platform::ProfilePaths;
use driftwood::services::internal_pages::InternalPage;
use driftwood::services::settings_store::PrivacyFlag;
use driftwood::shell::{ChromeCommand, Shell};
use driftwood::types::errors::{ShellError, TabError};
use driftwood::types::settings::ThemeMode;
use driftwood::types::tab::TabId;

fn start(dir: &TempDir) -> (Shell<HeadlessFactory>, SharedLog) {
    let app = App::new(ProfilePaths::in_profile(dir.path()), None).unwrap();
    let factory = HeadlessFactory::new();
    let log = factory.log();
    (Shell::new(app, factory), log)
}

/// Starts past first run, with the homepage open.
fn started(dir: &TempDir) -> (Shell<HeadlessFactory>, SharedLog) {
    {
        let (mut shell, _) = start(dir);
        shell.open_window();
    }
    let (mut shell, log) = start(dir);
    shell.open_window();
    pump(&mut shell, &log);
    (shell, log)
}

/// Feeds queued engine callbacks to the shell until none are left.
fn pump(shell: &mut Shell<HeadlessFactory>, log: &SharedLog) {
    loop {
        let batch: Vec<_> = log.borrow_mut().events.drain(..).collect();
        if batch.is_empty() {
            break;
        }
        for (id, event) in batch {
            // Events for tabs closed in the meantime are dropped.
            let _ = shell.handle_engine_event(&id, event);
        }
    }
}

fn navigate(shell: &mut Shell<HeadlessFactory>, log: &SharedLog, input: &str) {
    shell
        .dispatch(ChromeCommand::Navigate { input: input.into() })
        .unwrap();
    pump(shell, log);
}

fn active_url(shell: &Shell<HeadlessFactory>) -> String {
    shell.tabs().get_active_tab().unwrap().url.clone()
}

fn active_id(shell: &Shell<HeadlessFactory>) -> TabId {
    shell.tabs().active_tab_id().cloned().unwrap()
}

#[test]
fn test_first_run_opens_setup_and_records_completion() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = start(&dir);
    assert!(shell.app().first_run);

    shell.open_window();
    pump(&mut shell, &log);
    assert_eq!(active_url(&shell), "drift://setup");
    assert!(!shell.app().first_run);

    let reopened = App::new(ProfilePaths::in_profile(dir.path()), None).unwrap();
    assert!(!reopened.first_run);
    assert!(reopened.settings().setup_completed);
}

#[test]
fn test_later_runs_open_homepage() {
    let dir = TempDir::new().unwrap();
    let (shell, _) = started(&dir);
    assert_eq!(active_url(&shell), "drift://newtab");
    assert_eq!(shell.tabs().tab_count(), 1);
}

#[test]
fn test_homepage_setting_is_resolved() {
    let dir = TempDir::new().unwrap();
    {
        let (mut shell, _) = start(&dir);
        shell.open_window();
        shell
            .dispatch(ChromeCommand::SetSetting {
                key: "homepage".into(),
                value: json!("example.org"),
            })
            .unwrap();
        shell.dispatch(ChromeCommand::SaveSettings).unwrap();
    }
    let (mut shell, _) = start(&dir);
    shell.open_window();
    assert_eq!(active_url(&shell), "https://example.org");
}

#[test]
fn test_navigate_searches_plain_text() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "rust borrow checker");
    assert_eq!(
        shell.tabs().get_active_view().unwrap().current_url(),
        "https://duckduckgo.com/?q=rust+borrow+checker"
    );
}

#[test]
fn test_search_engine_setting_applies() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    shell
        .dispatch_message(r#"{"cmd":"set_setting","key":"search_engine","value":"bing"}"#)
        .unwrap();
    navigate(&mut shell, &log, "weather");
    assert_eq!(active_url(&shell), "https://www.bing.com/search?q=weather");
}

#[test]
fn test_https_only_upgrades_plain_http() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    shell
        .app_mut()
        .settings
        .set_privacy(PrivacyFlag::HttpsOnly, true);
    navigate(&mut shell, &log, "http://example.com/page");
    assert_eq!(active_url(&shell), "https://example.com/page");
}

#[test]
fn test_finished_web_loads_are_recorded() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "example.com");

    let entries = shell.app().history().list_history(None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, "https://example.com");
    assert_eq!(entries[0].title, "example.com");
}

fn started_event(url: &str) -> EngineEvent {
    EngineEvent::LoadStarted { url: url.into() }
}

fn finished_event(url: &str) -> EngineEvent {
    EngineEvent::LoadFinished { url: url.into() }
}

fn title_event(title: &str) -> EngineEvent {
    EngineEvent::TitleChanged { title: title.into() }
}

#[test]
fn test_page_without_title_is_not_recorded_under_previous_title() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    let id = active_id(&shell);

    for event in [
        started_event("https://a.com"),
        title_event("Site A"),
        finished_event("https://a.com"),
        started_event("https://b.org/untitled"),
        finished_event("https://b.org/untitled"),
    ] {
        shell.handle_engine_event(&id, event).unwrap();
    }

    assert_eq!(shell.tabs().get_tab(&id).unwrap().title, "b.org");
    let entries = shell.app().history().list_history(None).unwrap();
    let titles: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.url.as_str(), e.title.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![("https://b.org/untitled", "b.org"), ("https://a.com", "Site A")]
    );
}

#[test]
fn test_title_after_load_finished_updates_history() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    let id = active_id(&shell);

    shell.handle_engine_event(&id, started_event("https://late.com")).unwrap();
    shell.handle_engine_event(&id, finished_event("https://late.com")).unwrap();
    shell.handle_engine_event(&id, title_event("Late Title")).unwrap();
    // A title for the next page must not touch the row above.
    shell.handle_engine_event(&id, started_event("https://next.com")).unwrap();
    shell.handle_engine_event(&id, title_event("Next")).unwrap();

    let entries = shell.app().history().list_history(None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Late Title");
    assert_eq!(shell.tabs().get_tab(&id).unwrap().title, "Next");
}

#[test]
fn test_title_after_clear_history_is_harmless() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    let id = active_id(&shell);

    shell.handle_engine_event(&id, started_event("https://a.com")).unwrap();
    shell.handle_engine_event(&id, finished_event("https://a.com")).unwrap();
    shell.dispatch(ChromeCommand::ClearHistory).unwrap();
    shell.handle_engine_event(&id, title_event("A")).unwrap();

    assert_eq!(shell.app().history().count().unwrap(), 0);
}

#[test]
fn test_internal_pages_are_not_recorded() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    shell.dispatch(ChromeCommand::OpenSettings).unwrap();
    shell.dispatch(ChromeCommand::OpenHistory).unwrap();
    pump(&mut shell, &log);
    assert_eq!(shell.app().history().count().unwrap(), 0);
}

#[test]
fn test_failed_load_sets_error_and_skips_history() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "https://nowhere.invalid");

    let state = shell.chrome_state();
    assert!(state.error.is_some());
    assert!(!state.loading);
    assert_eq!(shell.app().history().count().unwrap(), 0);
}

#[test]
fn test_closing_last_tab_leaves_new_tab_page() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    let first = active_id(&shell);
    navigate(&mut shell, &log, "example.com");

    shell.dispatch(ChromeCommand::CloseTab { id: None }).unwrap();
    assert_eq!(shell.tabs().tab_count(), 1);
    assert_ne!(active_id(&shell), first);
    assert_eq!(active_url(&shell), "drift://newtab");
    assert!(log.borrow().destroyed.contains(&first));
}

#[test]
fn test_close_and_switch_reject_unknown_tabs() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    let ghost = TabId::from("ghost");
    assert!(matches!(
        shell.dispatch(ChromeCommand::SwitchTab { id: ghost.clone() }),
        Err(ShellError::Tab(TabError::NotFound(_)))
    ));
    assert!(matches!(
        shell.dispatch(ChromeCommand::CloseTab { id: Some(ghost) }),
        Err(ShellError::Tab(TabError::NotFound(_)))
    ));
}

#[test]
fn test_only_active_view_is_visible() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    let first = active_id(&shell);
    shell.dispatch(ChromeCommand::NewTab).unwrap();
    let second = active_id(&shell);

    let last_visibility = |id: &TabId| {
        calls_for(&log, id)
            .into_iter()
            .filter_map(|c| match c {
                ViewCall::Visible(v) => Some(v),
                _ => None,
            })
            .last()
    };
    assert_eq!(last_visibility(&first), Some(false));
    assert_eq!(last_visibility(&second), Some(true));

    shell
        .dispatch(ChromeCommand::SwitchTab { id: first.clone() })
        .unwrap();
    assert_eq!(last_visibility(&first), Some(true));
    assert_eq!(last_visibility(&second), Some(false));
}

#[test]
fn test_open_settings_reuses_existing_tab() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    let home = active_id(&shell);

    shell.dispatch(ChromeCommand::OpenSettings).unwrap();
    pump(&mut shell, &log);
    let settings_tab = active_id(&shell);
    assert_eq!(active_url(&shell), "drift://settings");

    shell
        .dispatch(ChromeCommand::SwitchTab { id: home })
        .unwrap();
    shell.dispatch(ChromeCommand::OpenSettings).unwrap();
    assert_eq!(active_id(&shell), settings_tab);
    assert_eq!(shell.tabs().tab_count(), 2);
}

#[test]
fn test_zoom_setting_reaches_every_view() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    let first = active_id(&shell);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "zoom_level".into(),
            value: json!(150),
        })
        .unwrap();
    assert!(calls_for(&log, &first).contains(&ViewCall::Zoom(150)));

    shell.dispatch(ChromeCommand::NewTab).unwrap();
    let second = active_id(&shell);
    assert_eq!(calls_for(&log, &second).first(), Some(&ViewCall::Zoom(150)));
}

#[test]
fn test_invalid_setting_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    let result = shell.dispatch(ChromeCommand::SetSetting {
        key: "zoom_level".into(),
        value: json!(500),
    });
    assert!(matches!(result, Err(ShellError::Settings(_))));
    assert_eq!(shell.app().settings().zoom_level, 100);
}

#[test]
fn test_theme_setting_updates_chrome_state() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "accent_color".into(),
            value: json!("#ff5500"),
        })
        .unwrap();
    assert!(shell.chrome_state().theme_css.contains("#ff5500"));
}

#[test]
fn test_theme_override_survives_setting_change() {
    let dir = TempDir::new().unwrap();
    let app = App::new(ProfilePaths::in_profile(dir.path()), Some(ThemeMode::Light)).unwrap();
    let mut shell = Shell::new(app, HeadlessFactory::new());
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "theme".into(),
            value: json!("dark"),
        })
        .unwrap();
    assert_eq!(shell.app().settings().theme, ThemeMode::Dark);
    assert_eq!(shell.app().theme_override(), Some(ThemeMode::Light));
}

#[test]
fn test_reset_settings_reloads_open_settings_page() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "https_only".into(),
            value: json!(true),
        })
        .unwrap();
    shell.dispatch(ChromeCommand::OpenSettings).unwrap();
    pump(&mut shell, &log);
    let settings_tab = active_id(&shell);

    shell.dispatch(ChromeCommand::ResetSettings).unwrap();
    assert!(!shell.app().settings().https_only);
    assert!(calls_for(&log, &settings_tab).contains(&ViewCall::Reload));
}

#[test]
fn test_complete_setup_saves_and_goes_home() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = start(&dir);
    shell.open_window();
    pump(&mut shell, &log);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "theme".into(),
            value: json!("dark"),
        })
        .unwrap();

    shell.dispatch(ChromeCommand::CompleteSetup).unwrap();
    pump(&mut shell, &log);
    assert_eq!(active_url(&shell), "drift://newtab");

    let reopened = App::new(ProfilePaths::in_profile(dir.path()), None).unwrap();
    assert_eq!(reopened.settings().theme, ThemeMode::Dark);
}

#[test]
fn test_complete_setup_navigates_setup_tab_not_active_tab() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = start(&dir);
    let setup_tab = shell.open_window();
    pump(&mut shell, &log);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "homepage".into(),
            value: json!("example.org"),
        })
        .unwrap();
    shell.dispatch(ChromeCommand::NewTab).unwrap();
    navigate(&mut shell, &log, "rust-lang.org");
    let other_tab = active_id(&shell);

    shell.dispatch(ChromeCommand::CompleteSetup).unwrap();
    pump(&mut shell, &log);

    assert_eq!(
        shell.tabs().get_tab(&setup_tab).unwrap().url,
        "https://example.org"
    );
    assert_eq!(
        shell.tabs().get_tab(&other_tab).unwrap().url,
        "https://rust-lang.org"
    );
    assert_eq!(active_id(&shell), other_tab);
}

#[test]
fn test_tabs_are_restored_on_next_start() {
    let dir = TempDir::new().unwrap();
    {
        let (mut shell, log) = started(&dir);
        navigate(&mut shell, &log, "example.com");
        let first = active_id(&shell);
        shell.dispatch(ChromeCommand::NewTab).unwrap();
        navigate(&mut shell, &log, "rust-lang.org");
        shell.dispatch(ChromeCommand::OpenHistory).unwrap();
        pump(&mut shell, &log);
        shell.dispatch(ChromeCommand::SwitchTab { id: first }).unwrap();
        shell.shutdown();
    }

    let (mut shell, log) = start(&dir);
    let active = shell.open_window();
    pump(&mut shell, &log);

    let urls: Vec<String> = shell.tabs().get_all_tabs().map(|t| t.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com".to_string(),
            "https://rust-lang.org".to_string(),
            "drift://history".to_string(),
        ]
    );
    assert_eq!(active_id(&shell), active);
    assert_eq!(active_url(&shell), "https://example.com");
    let visible: Vec<bool> = shell
        .tabs()
        .get_all_tabs()
        .map(|t| calls_for(&log, &t.id).last() == Some(&ViewCall::Visible(true)))
        .collect();
    assert_eq!(visible, vec![true, false, false]);
}

#[test]
fn test_restore_tabs_off_opens_homepage() {
    let dir = TempDir::new().unwrap();
    {
        let (mut shell, log) = started(&dir);
        navigate(&mut shell, &log, "example.com");
        shell
            .dispatch(ChromeCommand::SetSetting {
                key: "restore_tabs".into(),
                value: json!(false),
            })
            .unwrap();
        shell.dispatch(ChromeCommand::SaveSettings).unwrap();
        shell.shutdown();
        assert!(!shell.app().session().has_session().unwrap());
    }

    let (mut shell, _) = start(&dir);
    shell.open_window();
    assert_eq!(shell.tabs().tab_count(), 1);
    assert_eq!(active_url(&shell), "drift://newtab");
}

#[test]
fn test_setup_page_is_not_restored() {
    let dir = TempDir::new().unwrap();
    {
        let (mut shell, log) = start(&dir);
        shell.open_window();
        pump(&mut shell, &log);
        assert!(shell.snapshot_session().tabs.is_empty());
        shell.shutdown();
    }

    let (mut shell, _) = start(&dir);
    shell.open_window();
    assert_eq!(shell.tabs().tab_count(), 1);
    assert_eq!(active_url(&shell), "drift://newtab");
}

#[test]
fn test_clear_history_empties_log_and_refreshes_page() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "example.com");
    navigate(&mut shell, &log, "example.org");
    assert_eq!(shell.app().history().count().unwrap(), 2);

    shell.dispatch(ChromeCommand::OpenHistory).unwrap();
    pump(&mut shell, &log);
    let history_tab = active_id(&shell);
    shell
        .dispatch_message(r#"{"cmd":"clear_history"}"#)
        .unwrap();

    assert_eq!(shell.app().history().count().unwrap(), 0);
    assert!(calls_for(&log, &history_tab).contains(&ViewCall::Reload));
}

#[test]
fn test_malformed_messages_are_errors() {
    let dir = TempDir::new().unwrap();
    let (mut shell, _) = started(&dir);
    for raw in ["not json", r#"{"cmd":"explode"}"#, r#"{"cmd":"navigate"}"#] {
        assert!(matches!(
            shell.dispatch_message(raw),
            Err(ShellError::MalformedMessage(_))
        ));
    }
}

#[test]
fn test_chrome_state_reflects_active_tab() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);

    let state = shell.chrome_state();
    assert_eq!(state.address, "");
    assert_eq!(state.title, "New Tab");
    assert!(!state.can_go_back);

    navigate(&mut shell, &log, "example.com");
    let state = shell.chrome_state();
    assert_eq!(state.address, "https://example.com");
    assert_eq!(state.title, "example.com");
    assert!(!state.loading);
    assert!(state.can_go_back);
    assert_eq!(state.tabs.len(), 1);
    assert_eq!(state.active_id, Some(active_id(&shell)));
}

#[test]
fn test_back_and_forward_commands() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "example.com");
    shell.dispatch(ChromeCommand::Back).unwrap();
    pump(&mut shell, &log);
    assert_eq!(active_url(&shell), "drift://newtab");
    shell.dispatch(ChromeCommand::Forward).unwrap();
    pump(&mut shell, &log);
    assert_eq!(active_url(&shell), "https://example.com");
}

#[test]
fn test_auto_reload_fires_on_deadline_for_web_pages() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    assert!(shell.next_auto_reload().is_none());

    navigate(&mut shell, &log, "example.com");
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "auto_reload".into(),
            value: json!(true),
        })
        .unwrap();
    let deadline = shell.next_auto_reload().unwrap();
    let tab = active_id(&shell);

    assert!(!shell.on_timer(deadline - Duration::from_secs(1)));
    assert!(!calls_for(&log, &tab).contains(&ViewCall::Reload));

    assert!(shell.on_timer(deadline));
    assert!(calls_for(&log, &tab).contains(&ViewCall::Reload));
    assert_eq!(shell.next_auto_reload(), Some(deadline + Duration::from_secs(30)));
}

#[test]
fn test_auto_reload_skips_internal_pages() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    shell
        .dispatch(ChromeCommand::SetSetting {
            key: "auto_reload".into(),
            value: json!(true),
        })
        .unwrap();
    let deadline = shell.next_auto_reload().unwrap();
    assert!(!shell.on_timer(deadline));
    assert!(!calls_for(&log, &active_id(&shell)).contains(&ViewCall::Reload));
}

#[test]
fn test_render_path_serves_pages() {
    let dir = TempDir::new().unwrap();
    let (mut shell, log) = started(&dir);
    navigate(&mut shell, &log, "example.com");

    let history = shell.render_path("/history");
    assert!(history.contains("<title>History</title>"));
    assert!(history.contains("https://example.com"));

    let settings = shell.render_page(InternalPage::Settings);
    assert!(settings.contains("data-key=\"zoom_level\""));

    let fallback = shell.render_path("/no-such-page");
    assert!(fallback.contains("<title>New Tab</title>"));
}
