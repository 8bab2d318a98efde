// Example: a three-column grid with infinite loading.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use recycler::Dimension;
use recycler_adapter::{DataProvider, LayoutProvider, ListController, ListControllerOptions};

fn main() -> Result<(), recycler_adapter::ControllerError> {
    let wants_more = Arc::new(AtomicBool::new(false));
    let options = ListControllerOptions::new()
        .with_render_ahead_offset(120.0)
        .with_on_end_reached_threshold(200.0)
        .with_on_end_reached({
            let wants_more = Arc::clone(&wants_more);
            move || wants_more.store(true, Ordering::Relaxed)
        });
    let layout = LayoutProvider::new(|_| Dimension::new(120.0, 90.0));
    let data = DataProvider::new(|_| false).clone_with_rows(60, None);

    let mut c = ListController::new(options, layout, data);
    c.on_size_changed(Dimension::new(360.0, 540.0))?;

    let mut offset = 0.0;
    while offset < 3_000.0 {
        offset += 150.0;
        c.on_scroll(0.0, offset)?;
        if wants_more.swap(false, Ordering::Relaxed) {
            let grown = c.data_provider().len() + 30;
            c.set_data(c.data_provider().clone_with_rows(grown, None))?;
            println!("loaded more: {grown} items");
        }
        if let Some(target) = c.take_pending_scroll() {
            println!("host should scroll to {target:?}");
        }
    }

    for item in c.render_items() {
        println!("{} -> #{} at ({}, {})", item.key, item.index, item.layout.x, item.layout.y);
    }
    Ok(())
}
