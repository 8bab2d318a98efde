// Example: the viewability tracker on its own, without keys or a renderer.
use recycler::{Layout, Orientation, ViewabilityTracker};

fn main() {
    // Three columns per row, 60px rows.
    let layouts: Vec<Layout> = (0..300)
        .map(|i| Layout::new((i % 3) as f64 * 100.0, (i / 3) as f64 * 60.0, 100.0, 60.0))
        .collect();
    let content = 100.0 * 60.0;

    let mut t = ViewabilityTracker::new(60.0, 0.0);
    t.set_layouts(&layouts, content);
    t.set_viewport_extent(240.0, Orientation::Vertical);

    let update = t.init();
    println!("first fit: {:?}", update.engaged.map(|c| c.all));

    for offset in [90.0, 1_000.0, 5_760.0] {
        let update = t.update_offset(offset, 0.0, true);
        println!(
            "offset={offset} visible={:?} first_in_row={} entering={:?}",
            t.visible_indexes(),
            t.find_first_logically_visible_index(),
            update.engaged.map(|c| c.entering).unwrap_or_default()
        );
    }
    println!("{:?}", t.snapshot());
}
