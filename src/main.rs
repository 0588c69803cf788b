#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use psrunner::settings::{key_argument, AppSettings, SettingsStore};
use tracing::warn;

fn main() {
    psrunner::init_tracing();

    let settings = match SettingsStore::load() {
        Ok(store) => store.get(),
        Err(err) => {
            warn!(code = err.code(), error = %err, "using default settings");
            AppSettings::default()
        }
    };
    let key_arg = key_argument(std::env::args_os().skip(1));

    std::process::exit(app::run(settings, key_arg.as_deref()));
}

#[cfg(windows)]
mod app {
    use std::rc::Rc;

    use psrunner::history::default_backend;
    use psrunner::hotkey::{HotkeyRegistrar, KeyPressedEvent};
    use psrunner::launch::ShellLauncher;
    use psrunner::platform::windows::{show_error, DialogContext, RunDialog, Win32HotkeyHost};
    use psrunner::settings::AppSettings;
    use psrunner::state::DialogSlot;
    use tracing::{error, info};

    pub fn run(settings: AppSettings, key_arg: Option<&str>) -> i32 {
        let backend = match default_backend() {
            Ok(backend) => Rc::from(backend),
            Err(err) => {
                error!(code = err.code(), error = %err, "no history backend");
                return 1;
            }
        };
        let context = DialogContext {
            backend,
            launcher: Rc::new(ShellLauncher),
            history_limit: settings.history_limit,
            powershell_path: settings.powershell_path.clone(),
        };

        let host = match Win32HotkeyHost::new() {
            Ok(host) => host,
            Err(err) => {
                error!(code = err.code(), error = %err, "failed to create hotkey window");
                return 1;
            }
        };
        let mut registrar = HotkeyRegistrar::new(host);

        let slot: Rc<DialogSlot<RunDialog>> = Rc::new(DialogSlot::new());
        registrar.subscribe(move |event| {
            info!(hotkey = %event, "showing run dialog");
            slot.show_or_focus(
                || match RunDialog::create(context.clone()) {
                    Ok(dialog) => Some(dialog),
                    Err(err) => {
                        error!(code = err.code(), error = %err, "failed to open run dialog");
                        None
                    }
                },
                RunDialog::activate,
                RunDialog::run_modal,
            );
        });

        let modifiers = settings.modifiers();
        let key = settings.resolve_key(key_arg);
        if let Err(err) = registrar.register(modifiers, key) {
            let combination = KeyPressedEvent { modifiers, key };
            error!(hotkey = %combination, error = %err, "hotkey registration failed");
            show_error(
                None,
                "Error",
                &format!(
                    "Unable to register the global hotkey {combination}.\r\n\r\n\
                     Check to make sure that the key combination is not already in use by \
                     Windows or another application, and that PSRunner is not already \
                     running. Only one instance of PSRunner may run at a time."
                ),
            );
            return 1;
        }

        let code = match registrar.run() {
            Ok(()) => 0,
            Err(err) => {
                error!(code = err.code(), error = %err, "message loop failed");
                1
            }
        };
        registrar.dispose();
        code
    }
}

#[cfg(not(windows))]
mod app {
    use psrunner::settings::AppSettings;
    use tracing::error;

    pub fn run(_settings: AppSettings, _key_arg: Option<&str>) -> i32 {
        error!("PSRunner needs the Windows hotkey and shell APIs");
        1
    }
}
