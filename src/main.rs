use adw::Application;
use adw::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> glib::ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = Application::builder()
        .application_id("com.example.RealmateGtk")
        .build();
    app.connect_activate(|app| {
        realmate_gtk::app::build_ui(app);
    });
    app.run()
}
