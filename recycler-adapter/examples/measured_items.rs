// Example: items whose real size is only known after rendering.
use recycler::Dimension;
use recycler_adapter::{DataProvider, LayoutProvider, ListController, ListControllerOptions};

fn main() -> Result<(), recycler_adapter::ControllerError> {
    let layout = LayoutProvider::new(|_| Dimension::new(400.0, 80.0));
    let data = DataProvider::new(|_| false).clone_with_rows(1_000, None);
    let mut c = ListController::new(ListControllerOptions::new(), layout, data);
    c.on_size_changed(Dimension::new(400.0, 800.0))?;

    // The render layer measured every third item taller than estimated.
    for item in c.render_items() {
        if item.index % 3 == 0 {
            c.on_item_size_changed(item.index, Dimension::new(400.0, 130.0));
        }
    }
    println!("pending relayout from {:?}", c.pending_relayout());
    c.apply_pending_relayout()?;
    println!("content after measuring: {:?}", c.content_dimension());

    c.scroll_to_index(500);
    if let Some(target) = c.take_pending_scroll() {
        c.on_scroll(target.x, target.y)?;
    }
    println!(
        "first visible={} offset={}",
        c.find_approx_first_visible_index(),
        c.current_scroll_offset()
    );
    Ok(())
}
