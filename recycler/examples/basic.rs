// Example: a fixed-height list driven by scroll offsets.
use recycler::{
    CallbackListener, Dimension, Layout, LayoutManager, RenderStackParams, RendererOptions,
    VirtualRenderer,
};

struct FixedList {
    item_height: f64,
    width: f64,
    layouts: Vec<Layout>,
}

impl LayoutManager for FixedList {
    fn relayout_from_index(&mut self, start_index: usize, item_count: usize) {
        self.layouts.truncate(start_index.min(item_count));
        for i in self.layouts.len()..item_count {
            self.layouts.push(Layout::new(
                0.0,
                i as f64 * self.item_height,
                self.width,
                self.item_height,
            ));
        }
    }

    fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    fn content_dimension(&self) -> Dimension {
        Dimension::new(self.width, self.layouts.len() as f64 * self.item_height)
    }

    fn override_layout(&mut self, _index: usize, _dimension: Dimension) -> bool {
        false
    }
}

fn main() -> Result<(), recycler::RecyclerError> {
    let listener = CallbackListener::new()
        .with_on_render_stack_changed(|stack| {
            println!("render stack: {:?}", stack.sorted_by_index(usize::MAX));
        })
        .with_on_visible_indices_changed(|change| {
            println!(
                "visible={:?} entering={:?} leaving={:?}",
                change.all, change.entering, change.leaving
            );
        });

    let mut r = VirtualRenderer::with_listener(RendererOptions::new(), listener);
    r.set_params_and_dimensions(
        RenderStackParams::new(10_000).with_render_ahead_offset(100.0),
        Dimension::new(320.0, 480.0),
    );
    r.set_layout_manager(Box::new(FixedList {
        item_height: 48.0,
        width: 320.0,
        layouts: Vec::new(),
    }));
    r.init()?;

    for offset in [0.0, 200.0, 4_800.0, 250_000.0] {
        r.update_offset(0.0, offset, 0.0, true)?;
        println!(
            "offset={offset} slots={} pooled={}",
            r.render_stack().len(),
            r.recycle_pool().len()
        );
    }
    Ok(())
}
