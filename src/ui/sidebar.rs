use gtk4::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use crate::api::{Conversation, ConversationStatus};

pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    // row index -> conversation id, plus status for change detection
    rows: Rc<RefCell<Vec<(String, ConversationStatus)>>>,
}

impl Sidebar {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(260);

        let title = gtk::Label::new(Some("Conversations"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let scroller = gtk::ScrolledWindow::builder().vexpand(true).build();
        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        scroller.set_child(Some(&list));
        root.append(&scroller);

        Self { root, list, rows: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn connect_selected<F: Fn(String) + 'static>(&self, f: F) {
        let rows = self.rows.clone();
        self.list.connect_row_activated(move |_, row| {
            let id = usize::try_from(row.index())
                .ok()
                .and_then(|i| rows.borrow().get(i).map(|(id, _)| id.clone()));
            if let Some(id) = id {
                f(id);
            }
        });
    }

    pub fn set_items(&self, items: &[Conversation], selected: Option<&str>) {
        let summary: Vec<(String, ConversationStatus)> =
            items.iter().map(|c| (c.id.clone(), c.status)).collect();
        if *self.rows.borrow() != summary {
            while let Some(child) = self.list.first_child() {
                self.list.remove(&child);
            }
            for conv in items {
                self.list.append(&Self::row(conv));
            }
            *self.rows.borrow_mut() = summary;
        }
        let index =
            selected.and_then(|id| self.rows.borrow().iter().position(|(rid, _)| rid == id));
        match index.and_then(|i| self.list.row_at_index(i32::try_from(i).ok()?)) {
            Some(row) => self.list.select_row(Some(&row)),
            None => self.list.unselect_all(),
        }
    }

    fn row(conv: &Conversation) -> gtk::ListBoxRow {
        let row = gtk::ListBoxRow::new();
        let content = gtk::Box::new(gtk::Orientation::Vertical, 2);
        content.set_margin_top(8);
        content.set_margin_bottom(8);
        content.set_margin_start(8);
        content.set_margin_end(8);

        let label = gtk::Label::new(Some(&conv.id));
        label.set_halign(gtk::Align::Start);
        label.set_ellipsize(gtk::pango::EllipsizeMode::Middle);
        content.append(&label);

        let status = gtk::Label::new(Some(conv.status.label()));
        status.set_halign(gtk::Align::Start);
        status.add_css_class("caption");
        status.add_css_class(if conv.is_open() { "success" } else { "error" });
        content.append(&status);

        row.set_child(Some(&content));
        row
    }
}
