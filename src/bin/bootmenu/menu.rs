//! Demo menu tree driven through the blocking decision API.

use std::fs;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use bootmenu::canvas::BackgroundIcon;
use bootmenu::config::AppConfig;
use bootmenu::device::SystemActions;
use bootmenu::log_debug;
use bootmenu::ui::{Decision, Engine, MenuItem};

const TABS: [&str; 3] = ["Menu", "Tools", "Log"];
const MENU_TAB: usize = 0;
const TOOLS_TAB: usize = 1;
const BOOT_SECONDS: u32 = 3;
const LOG_DEMO_LINES: usize = 24;
const GO_BACK: &str = "<--Go Back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Exit,
}

/// Walk the menu tree until the user cancels at the top level or the engine stops.
pub(crate) fn run(engine: &Engine, config: &AppConfig, system: &dyn SystemActions) -> Result<()> {
    let headers = vec![
        format!("Bootmenu v{}", env!("CARGO_PKG_VERSION")),
        format!("input: {}", config.input.label()),
        String::new(),
    ];
    let tabs: Vec<String> = TABS.iter().map(|tab| tab.to_string()).collect();

    engine.show_overlay(true);
    engine.set_background(Some(BackgroundIcon::Default));
    engine.log_line("Start BootMenu....");
    if !config.allow_reboot {
        engine.log_line("Reboot disabled (--allow-reboot)");
    }

    let mut shown_tab = MENU_TAB;
    let mut selection = 0;
    loop {
        // The tab can also change behind our back through the hotkey.
        let tab = engine.active_tab();
        if tab != shown_tab {
            shown_tab = tab;
            selection = 0;
        }
        let items = items_for(tab);
        let Some(decision) = engine.menu_selection(&headers, &tabs, &items, selection) else {
            break;
        };
        match decision {
            Decision::Cancel => break,
            Decision::NextTab(_) => {}
            Decision::ItemSelected(index) => {
                selection = index;
                let flow = match tab {
                    MENU_TAB => main_action(engine, system, &headers, &tabs, index),
                    TOOLS_TAB => tools_action(engine, index),
                    _ => Flow::Stay,
                };
                if flow == Flow::Exit {
                    break;
                }
            }
        }
    }
    log_debug("menu tree finished");
    Ok(())
}

fn items_for(tab: usize) -> Vec<MenuItem> {
    let titles: &[&str] = match tab {
        MENU_TAB => &["Boot", "Recovery", "Tools", "Reboot"],
        TOOLS_TAB => &["Log demo", "Toggle background", "Wait for a key", GO_BACK],
        _ => &[],
    };
    titles.iter().map(|title| MenuItem::small(*title)).collect()
}

fn main_action(
    engine: &Engine,
    system: &dyn SystemActions,
    headers: &[String],
    tabs: &[String],
    index: usize,
) -> Flow {
    match index {
        0 => {
            engine.log_line("Booting...");
            engine.show_progress(1.0, BOOT_SECONDS);
            thread::sleep(Duration::from_secs(u64::from(BOOT_SECONDS)) + Duration::from_millis(300));
            engine.reset_progress();
            engine.log_line("Boot sequence done.");
            Flow::Stay
        }
        1 => recovery_menu(engine, headers, tabs),
        2 => {
            engine.set_active_tab(TOOLS_TAB);
            Flow::Stay
        }
        3 => {
            engine.log_line("Rebooting...");
            system.reboot();
            Flow::Exit
        }
        _ => Flow::Stay,
    }
}

fn recovery_menu(engine: &Engine, headers: &[String], tabs: &[String]) -> Flow {
    let items: Vec<MenuItem> = ["Custom Recovery", "Stable Recovery", "Stock Recovery", GO_BACK]
        .iter()
        .map(|title| MenuItem::small(*title))
        .collect();
    let mut selection = 0;
    loop {
        let Some(decision) = engine.menu_selection(headers, tabs, &items, selection) else {
            return Flow::Exit;
        };
        match decision {
            Decision::ItemSelected(index) if index + 1 < items.len() => {
                selection = index;
                engine.log_line(&format!("Preparing {}...", items[index].title));
                engine.show_indeterminate_progress();
                thread::sleep(Duration::from_secs(2));
                engine.reset_progress();
                engine.log_line("Recovery image not present, staying in the menu.");
            }
            Decision::ItemSelected(_) | Decision::Cancel | Decision::NextTab(_) => {
                return Flow::Stay
            }
        }
    }
}

fn tools_action(engine: &Engine, index: usize) -> Flow {
    match index {
        0 => {
            let lines = fs::read_to_string("/proc/cpuinfo").unwrap_or_else(|err| {
                format!("cpuinfo unavailable: {err}\n")
            });
            for line in lines.lines().take(LOG_DEMO_LINES) {
                engine.log_line(line);
            }
            Flow::Stay
        }
        1 => {
            let icon = engine.with_state(|state| state.background);
            let next = match icon {
                Some(BackgroundIcon::Default) => Some(BackgroundIcon::Alternate),
                Some(BackgroundIcon::Alternate) => None,
                None => Some(BackgroundIcon::Default),
            };
            engine.set_background(next);
            Flow::Stay
        }
        2 => {
            engine.log_line("Press any key...");
            engine.clear_events();
            match engine.wait_key() {
                Some(code) => {
                    engine.log_line(&format!("Key code {code}"));
                    Flow::Stay
                }
                None => Flow::Exit,
            }
        }
        _ => {
            engine.set_active_tab(MENU_TAB);
            Flow::Stay
        }
    }
}
