//! The desktop host: a tao event loop driving the shell.
//!
//! All OS callbacks (hotkeys, menu clicks, webview callbacks, forwarded
//! activations) are posted into the loop as [`UserEvent`]s, so the shell only
//! ever runs on the main thread.

mod host;
mod tray;

use std::thread;

use global_hotkey::{GlobalHotKeyEvent, HotKeyState};
use popcorn_engine::{
    Flow, MenuId, Result, Shell, ShellEvent,
    host::{Desktop, HotkeyId},
};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use tao::{
    event::{Event, StartCause, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::{net::UnixListener, runtime::Runtime, sync::mpsc};
use tracing::{debug, error, info, trace};
use tray_icon::menu::MenuEvent;

use self::host::{DesktopHost, DesktopState, map_theme};
use crate::{Launch, instance};

/// Events posted into the tao loop from other threads and callbacks.
#[derive(Debug)]
pub enum UserEvent {
    /// An event for the shell.
    Shell(ShellEvent),
}

/// Post `event` to the loop. Fails only once the loop is gone.
fn post(proxy: &EventLoopProxy<UserEvent>, event: ShellEvent) {
    if proxy.send_event(UserEvent::Shell(event)).is_err() {
        trace!("event loop closed; dropping event");
    }
}

/// Show a blocking error dialog.
pub fn error_dialog(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Route hotkey presses and menu clicks into the loop.
fn install_event_handlers(proxy: &EventLoopProxy<UserEvent>) {
    let hotkey_proxy = proxy.clone();
    GlobalHotKeyEvent::set_event_handler(Some(move |ev: GlobalHotKeyEvent| {
        if ev.state == HotKeyState::Pressed {
            post(&hotkey_proxy, ShellEvent::Hotkey(HotkeyId(ev.id)));
        }
    }));
    let menu_proxy = proxy.clone();
    MenuEvent::set_event_handler(Some(move |ev: MenuEvent| {
        post(&menu_proxy, ShellEvent::Menu(MenuId(ev.id.0)));
    }));
}

/// Serve activations from later instances on a background thread.
fn spawn_activation_listener(rt: Runtime, listener: UnixListener, proxy: EventLoopProxy<UserEvent>) {
    thread::spawn(move || {
        rt.block_on(async move {
            let (tx, mut rx) = mpsc::unbounded_channel();
            tokio::spawn(async move {
                if let Err(err) = instance::serve(listener, tx).await {
                    debug!(?err, "activation listener exited");
                }
            });
            while let Some(activation) = rx.recv().await {
                match activation.url {
                    Some(url) => post(&proxy, ShellEvent::OpenUrl(url)),
                    None => debug!("second instance started without a URL"),
                }
            }
        });
    });
}

/// Run the shell until the user quits. Returns only on a setup failure.
pub fn run(launch: Launch) -> Result<()> {
    let Launch {
        config,
        config_path,
        url,
        activations,
        socket,
    } = launch;

    #[allow(unused_mut)]
    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    #[cfg(target_os = "macos")]
    {
        use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
        event_loop.set_activation_policy(ActivationPolicy::Accessory);
    }
    let proxy = event_loop.create_proxy();

    let mut state = DesktopState::new(proxy.clone())?;
    install_event_handlers(&proxy);
    if let Some((rt, listener)) = activations {
        spawn_activation_listener(rt, listener, proxy);
    }

    let mut shell = Shell::new(config, config_path);
    let mut initial_url = url;

    info!("starting event loop");
    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;
        let mut host = DesktopHost {
            target,
            state: &mut state,
        };

        let flow = match event {
            Event::NewEvents(StartCause::Init) => {
                host.state.install_tray();
                match shell.start(&mut host) {
                    Ok(()) => {
                        if let Some(url) = initial_url.take() {
                            shell.open_url(&mut host, &url);
                        }
                        Flow::Continue
                    }
                    Err(e) => {
                        error!("startup failed: {}", e);
                        host.show_error("Error", &e.user_message());
                        *control_flow = ControlFlow::ExitWithCode(1);
                        return;
                    }
                }
            }
            Event::UserEvent(UserEvent::Shell(ev)) => shell.handle(&mut host, ev),
            Event::WindowEvent { event, .. } => {
                let ev = match event {
                    WindowEvent::Focused(true) => Some(ShellEvent::PanelFocused),
                    WindowEvent::Focused(false) => Some(ShellEvent::PanelBlurred),
                    WindowEvent::CloseRequested => Some(ShellEvent::PanelCloseRequested),
                    WindowEvent::ThemeChanged(theme) => {
                        Some(ShellEvent::ThemeChanged(map_theme(theme)))
                    }
                    _ => None,
                };
                ev.map_or(Flow::Continue, |ev| shell.handle(&mut host, ev))
            }
            Event::LoopDestroyed => {
                instance::cleanup(&socket);
                Flow::Continue
            }
            _ => Flow::Continue,
        };

        if flow == Flow::Exit || host.state.quit_requested {
            *control_flow = ControlFlow::Exit;
        }
    })
}
