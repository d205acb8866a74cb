use adw::Application;
use adw::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::ApiClient;
use crate::app::AppConfig;
use crate::controller;
use crate::state::{self, Action, ViewState};
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;

/// Widgets plus the single view state they render.
struct Shell {
    state: RefCell<ViewState>,
    client: Option<ApiClient>,
    sidebar: Sidebar,
    chat: ChatView,
    overlay: adw::ToastOverlay,
}

fn dispatch(shell: &Rc<Shell>, action: Action) {
    let (snapshot, request) = {
        let mut current = shell.state.borrow_mut();
        let (next, request) = state::update(&current, action);
        *current = next.clone();
        (next, request)
    };
    render(shell, &snapshot);

    if let Some(request) = request {
        let Some(client) = shell.client.clone() else { return };
        let shell = shell.clone();
        crate::utils::run_async_to_main(
            async move { controller::execute(&client, request).await },
            move |action| dispatch(&shell, action),
        );
    }
}

fn render(shell: &Rc<Shell>, snapshot: &ViewState) {
    shell.sidebar.set_items(
        &snapshot.conversations,
        snapshot.pending.as_deref().or(snapshot.selected.as_ref().map(|c| c.id.as_str())),
    );
    shell.chat.render(snapshot);
    if let Some(notice) = &snapshot.notice {
        shell.overlay.add_toast(adw::Toast::new(notice));
        dispatch(shell, Action::DismissNotice);
    }
}

pub fn show_main_window(app: &Application, config: &AppConfig) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Realmate")
        .default_width(960)
        .default_height(640)
        .build();

    let overlay = adw::ToastOverlay::new();

    let split = adw::Flap::builder()
        .reveal_flap(true)
        .locked(true)
        .modal(false)
        .build();

    let sidebar = Sidebar::new();
    split.set_flap(Some(&sidebar.widget()));

    let chat = ChatView::new();
    split.set_content(Some(&chat.widget()));

    overlay.set_child(Some(&split));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some("Conversations"));
    header.set_title_widget(Some(&title));

    let refresh_btn = gtk4::Button::from_icon_name("view-refresh-symbolic");
    refresh_btn.set_tooltip_text(Some("Reload conversations"));
    header.pack_start(&refresh_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));
    window.present();

    let mut initial = ViewState::new();
    let client = match ApiClient::new(&config.base_url) {
        Ok(client) => Some(client),
        Err(e) => {
            log::error!("Cannot talk to {}: {e}", config.base_url);
            initial.notice = Some(e.to_string());
            None
        }
    };

    let shell = Rc::new(Shell { state: RefCell::new(initial), client, sidebar, chat, overlay });

    {
        let shell_for_select = shell.clone();
        shell.sidebar.connect_selected(move |id| dispatch(&shell_for_select, Action::Select(id)));
    }
    {
        let shell_for_draft = shell.clone();
        shell.chat.connect_draft_changed(move |text| {
            if shell_for_draft.state.borrow().draft != text {
                dispatch(&shell_for_draft, Action::EditDraft(text));
            }
        });
    }
    {
        let shell_for_send = shell.clone();
        shell.chat.connect_send(move || dispatch(&shell_for_send, Action::Send));
    }
    {
        let shell_for_close = shell.clone();
        shell.chat.connect_close(move || dispatch(&shell_for_close, Action::Close));
    }
    {
        let shell_for_refresh = shell.clone();
        refresh_btn.connect_clicked(move |_| dispatch(&shell_for_refresh, Action::Refresh));
    }

    dispatch(&shell, Action::Refresh);
}
