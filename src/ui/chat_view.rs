use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;

use crate::api::{Conversation, Direction};
use crate::state::ViewState;

// (conversation id, message count, open) of what is currently drawn
type Rendered = Option<(String, usize, bool)>;

pub struct ChatView {
    root: gtk::Box,
    title: gtk::Label,
    close_btn: gtk::Button,
    closed_notice: gtk::Label,
    placeholder: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    input_row: gtk::Box,
    entry: gtk::Entry,
    send_btn: gtk::Button,
    rendered: RefCell<Rendered>,
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let title = gtk::Label::new(None);
        title.add_css_class("title-4");
        title.set_halign(gtk::Align::Start);
        title.set_hexpand(true);
        let close_btn = gtk::Button::with_label("Close Conversation");
        close_btn.add_css_class("destructive-action");
        header.append(&title);
        header.append(&close_btn);
        root.append(&header);

        let closed_notice = gtk::Label::new(Some(
            "Conversation closed. Messages can no longer be sent or received.",
        ));
        closed_notice.add_css_class("error");
        closed_notice.set_halign(gtk::Align::Start);
        root.append(&closed_notice);

        let placeholder = gtk::Label::new(None);
        placeholder.add_css_class("dim-label");
        placeholder.set_vexpand(true);
        root.append(&placeholder);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type a message…"));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        Self {
            root,
            title,
            close_btn,
            closed_notice,
            placeholder,
            scroller,
            messages_box,
            input_row,
            entry,
            send_btn,
            rendered: RefCell::new(None),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_draft_changed<F: Fn(String) + 'static>(&self, f: F) {
        self.entry.connect_changed(move |entry| f(entry.text().to_string()));
    }

    /// Fires on the Send button and on Enter in the entry.
    pub fn connect_send<F: Fn() + Clone + 'static>(&self, f: F) {
        let on_click = f.clone();
        self.send_btn.connect_clicked(move |_| on_click());
        self.entry.connect_activate(move |_| f());
    }

    pub fn connect_close<F: Fn() + 'static>(&self, f: F) {
        self.close_btn.connect_clicked(move |_| f());
    }

    pub fn render(&self, state: &ViewState) {
        let selected = state.selected.as_ref().filter(|_| !state.loading);

        self.placeholder.set_visible(selected.is_none());
        if state.loading {
            self.placeholder.set_text("Loading messages…");
        } else {
            self.placeholder.set_text("Select a conversation to view its messages.");
        }
        self.scroller.set_visible(selected.is_some());
        let title = selected.map(|c| format!("Conversation {}", c.id));
        self.title.set_text(&title.unwrap_or_default());
        self.close_btn.set_visible(state.close_visible());
        self.close_btn.set_sensitive(state.can_close());
        self.closed_notice.set_visible(selected.is_some_and(|c| !c.is_open()));
        self.input_row.set_visible(state.input_visible());
        self.send_btn.set_sensitive(state.can_send());
        if self.entry.text().as_str() != state.draft {
            self.entry.set_text(&state.draft);
        }

        let key = selected.map(|c| (c.id.clone(), c.messages.len(), c.is_open()));
        if *self.rendered.borrow() != key {
            self.fill_messages(selected);
            *self.rendered.borrow_mut() = key;
        }
    }

    fn fill_messages(&self, conv: Option<&Conversation>) {
        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        let Some(conv) = conv else { return };
        for msg in &conv.messages {
            let lbl = gtk::Label::new(Some(&msg.content));
            lbl.set_wrap(true);
            lbl.add_css_class("card");
            match msg.direction {
                Direction::Sent => lbl.set_halign(gtk::Align::End),
                Direction::Received => lbl.set_halign(gtk::Align::Start),
            }
            self.messages_box.append(&lbl);
        }
        let adj = self.scroller.vadjustment();
        adj.set_value(adj.upper());
    }
}
