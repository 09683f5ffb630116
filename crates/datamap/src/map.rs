use std::time::Duration;

use datamap_core::data::{Boundary, DataPoint, Edge, Label, MetaData, PointIndex};
use datamap_core::geometry::Point;
use datamap_core::{
    ConnectionIndex, HighlightArrays, IndexSet, MergedSelection, SelectionStore, SpatialIndex,
};
use datamap_io::{EdgeColumns, PointColumns};
use datamap_render::render_data::ChevronMarker;
use datamap_render::{
    chevron, wait_for_font, DataBounds, FontWait, HighlightProjector, HistogramSink,
    LayerDescriptor, LayerStack, RenderFrame, Renderer, ViewState, Viewport,
};

use crate::error::DataMapError;
use crate::options::{
    BoundaryStyle, DataMapConfig, EdgeStyle, LabelStyle, MetaDataOptions, PointStyle,
};

const HOVER_TEXT_FIELD: &str = "hover_text";

/// An interactive point/edge/label map with multi-source selection highlighting.
///
/// Every selection change runs one synchronous highlight pass: merge all
/// sources, recompute the highlight arrays, project them onto the layers and
/// hand the reordered layer list to the renderer.
pub struct DataMap<R: Renderer> {
    renderer: R,
    config: DataMapConfig,
    view_state: ViewState,

    points: Vec<DataPoint>,
    edges: Vec<Edge>,
    chevrons: Vec<ChevronMarker>,
    labels: Vec<Label>,
    meta: Option<MetaData>,
    tooltips: bool,
    /// Lower-cased copy of the search column.
    search_index: Option<Vec<String>>,

    connections: ConnectionIndex,
    spatial: SpatialIndex,
    selection: SelectionStore,
    highlight: HighlightArrays,
    projector: HighlightProjector,
    layers: LayerStack,
    histogram: Option<Box<dyn HistogramSink>>,
}

impl<R: Renderer> DataMap<R> {
    /// Set up the map and its initial camera. Fails on unusable bounds or viewport.
    pub fn new(
        config: DataMapConfig,
        viewport: Viewport,
        mut renderer: R,
    ) -> Result<Self, DataMapError> {
        let bounds = DataBounds::from_array(config.bounds)?;
        let view_state = viewport.initial_view_state(&bounds, config.zoom_padding);
        renderer.set_view_state(&view_state);
        log::info!(
            "DataMap created: center ({}, {}), zoom {:.3}",
            view_state.longitude,
            view_state.latitude,
            view_state.zoom
        );

        let selection = SelectionStore::new(&config.lasso_selection_item_id, 0);
        Ok(Self {
            renderer,
            config,
            view_state,
            points: Vec::new(),
            edges: Vec::new(),
            chevrons: Vec::new(),
            labels: Vec::new(),
            meta: None,
            tooltips: false,
            search_index: None,
            connections: ConnectionIndex::default(),
            spatial: SpatialIndex::new(),
            selection,
            highlight: HighlightArrays::default(),
            projector: HighlightProjector::new(
                PointStyle::default().radius_min_pixels,
                LabelStyle::default().font_weight,
            ),
            layers: LayerStack::new(),
            histogram: None,
        })
    }

    // ── Loading ──────────────────────────────────────────────────────

    pub fn add_points(&mut self, points: Vec<DataPoint>, style: PointStyle) {
        self.points = points;
        self.selection.set_point_count(self.points.len());
        self.spatial = SpatialIndex::build(self.points.iter().map(|p| p.position));
        self.connections = ConnectionIndex::build(&self.edges, self.points.len());
        self.projector.base_radius_min_pixels = style.radius_min_pixels;

        self.layers.insert(LayerDescriptor::points(&self.points, style));
        log::info!("Added {} points", self.points.len());
        self.recompute();
    }

    pub fn add_points_json(&mut self, json: &str, style: PointStyle) -> Result<(), DataMapError> {
        let points = PointColumns::from_json(json)?.into_points()?;
        self.add_points(points, style);
        Ok(())
    }

    /// Add edges between already loaded points, positioned by `positions`.
    pub fn add_edges(&mut self, edges: Vec<Edge>, positions: &[Point], style: EdgeStyle) {
        self.edges = edges;
        self.connections = ConnectionIndex::build(&self.edges, self.points.len());
        self.chevrons = chevron::generate_chevrons(&self.edges, positions, style.chevron_spacing);

        self.layers.insert(LayerDescriptor::chevrons(self.chevrons.clone(), &style));
        self.layers.insert(LayerDescriptor::edges(&self.edges, positions, style));
        log::info!(
            "Added {} edges with {} chevron markers",
            self.edges.len(),
            self.chevrons.len()
        );
        self.recompute();
    }

    /// Add edges from JSON columns, positioned at the loaded points.
    pub fn add_edges_json(&mut self, json: &str, style: EdgeStyle) -> Result<(), DataMapError> {
        let edges = EdgeColumns::from_json(json)?.into_edges()?;
        let positions: Vec<Point> = self.points.iter().map(|p| p.position).collect();
        self.add_edges(edges, &positions, style);
        Ok(())
    }

    /// Add labels. Waits a bounded time for the font; on timeout the layer
    /// is built anyway with `font_ready = false`.
    pub fn add_labels(&mut self, labels: Vec<Label>, style: LabelStyle) {
        let wait = FontWait {
            max_wait: Duration::from_millis(style.font_wait_ms),
            poll_interval: Duration::from_millis(style.font_poll_ms.max(1)),
        };
        let font_ready = match wait_for_font(&self.renderer, &style.font_family, wait) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}; using fallback font", e);
                false
            }
        };

        self.projector.base_font_weight = style.font_weight;
        self.labels = labels;
        self.layers.insert(LayerDescriptor::labels(&self.labels, style, font_ready));
        log::info!("Added {} labels", self.labels.len());
        self.recompute();
    }

    pub fn add_labels_json(&mut self, json: &str, style: LabelStyle) -> Result<(), DataMapError> {
        let labels = datamap_io::labels_from_json(json)?;
        self.add_labels(labels, style);
        Ok(())
    }

    pub fn add_boundaries(&mut self, boundaries: Vec<Boundary>, style: BoundaryStyle) {
        log::info!("Added {} cluster boundaries", boundaries.len());
        self.layers.insert(LayerDescriptor::boundaries(&boundaries, style));
        self.renderer.update_layers(self.layers.layers());
    }

    pub fn add_boundaries_json(
        &mut self,
        json: &str,
        style: BoundaryStyle,
    ) -> Result<(), DataMapError> {
        let boundaries = datamap_io::boundaries_from_json(json)?;
        self.add_boundaries(boundaries, style);
        Ok(())
    }

    pub fn add_meta_data(&mut self, meta: MetaData, options: MetaDataOptions) {
        self.tooltips = options.tooltips && meta.has_column(HOVER_TEXT_FIELD);
        if self.tooltips {
            self.renderer.set_tooltips_enabled(true);
        }

        self.search_index = options.search_field.as_deref().and_then(|field| {
            let column = meta.column(field);
            if column.is_none() {
                log::warn!("Search field '{}' not found in metadata", field);
            }
            column.map(|values| values.iter().map(|v| v.to_lowercase()).collect())
        });
        self.meta = Some(meta);
    }

    pub fn add_meta_data_json(
        &mut self,
        json: &str,
        options: MetaDataOptions,
    ) -> Result<(), DataMapError> {
        let meta = datamap_io::metadata_from_json(json)?;
        self.add_meta_data(meta, options);
        Ok(())
    }

    pub fn connect_histogram(&mut self, histogram: Box<dyn HistogramSink>) {
        log::info!("Histogram '{}' connected", histogram.id());
        self.histogram = Some(histogram);
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Replace the selection held by `source_id` and run a highlight pass.
    pub fn add_selection<I>(&mut self, indices: I, source_id: &str)
    where
        I: IntoIterator<Item = PointIndex>,
    {
        self.selection.set_selection(source_id, indices);
        self.highlight_points(source_id);
    }

    /// Drop `source_id` from the merge and run a highlight pass.
    pub fn remove_selection(&mut self, source_id: &str) {
        self.selection.clear_selection(source_id);
        self.highlight_points(source_id);
    }

    /// Primary selection after merging all sources.
    pub fn selected_indices(&self) -> IndexSet {
        self.selection.merged_indices()
    }

    pub fn merged_selection(&self) -> MergedSelection {
        self.selection.merged()
    }

    /// Case-insensitive substring search over the configured search field.
    /// An empty term clears the search selection.
    pub fn search(&mut self, term: &str) {
        let source_id = self.config.search_item_id.clone();
        if term.is_empty() {
            self.selection.clear_selection(&source_id);
        } else if let Some(index) = &self.search_index {
            let needle = term.to_lowercase();
            let hits: Vec<PointIndex> = index
                .iter()
                .enumerate()
                .filter(|(_, value)| value.contains(&needle))
                .map(|(i, _)| i)
                .collect();
            log::debug!("Search '{}' matched {} points", term, hits.len());
            self.selection.set_selection(&source_id, hits);
        } else {
            log::warn!("Search requested but no search field is configured");
            self.selection.clear_selection(&source_id);
        }
        self.highlight_points(&source_id);
    }

    /// Select the points inside a drawn lasso polygon. Fewer than three
    /// vertices removes the lasso.
    pub fn lasso_select(&mut self, polygon: &[Point]) {
        let source_id = self.config.lasso_selection_item_id.clone();
        if polygon.len() < 3 {
            self.remove_selection(&source_id);
            return;
        }
        let indices = self.spatial.indices_in_polygon(polygon);
        self.add_selection(indices, &source_id);
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Hover text for `index`, when tooltips are enabled.
    pub fn tooltip(&self, index: PointIndex) -> Option<&str> {
        if !self.tooltips {
            return None;
        }
        self.meta.as_ref()?.value(HOVER_TEXT_FIELD, index)
    }

    /// Hover text of the point nearest to `position` in data coordinates.
    pub fn tooltip_at(&self, position: &Point) -> Option<(PointIndex, &str)> {
        let index = self.spatial.nearest(position)?;
        self.tooltip(index).map(|text| (index, text))
    }

    pub fn highlight(&self) -> &HighlightArrays {
        &self.highlight
    }

    pub fn layers(&self) -> &[LayerDescriptor] {
        self.layers.layers()
    }

    pub fn layer_version(&self) -> u64 {
        self.layers.version()
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn config(&self) -> &DataMapConfig {
        &self.config
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            layers: self.layers.layers().to_vec(),
            view_state: self.view_state,
        }
    }

    // ── Highlight pass ───────────────────────────────────────────────

    fn recompute(&mut self) -> MergedSelection {
        let merged = self.selection.merged();
        self.highlight = HighlightArrays::compute(
            &merged,
            &self.connections,
            self.points.len(),
            self.edges.len(),
        );
        let projection = self
            .projector
            .project(&merged, &self.highlight, &self.labels, &self.chevrons);
        let version = self.layers.apply(&projection);
        self.renderer.update_layers(self.layers.layers());

        log::debug!(
            "Highlight pass {}: {} selected, {} active",
            version,
            merged.selected.len(),
            self.highlight.active_count()
        );
        merged
    }

    fn highlight_points(&mut self, trigger: &str) {
        let merged = self.recompute();

        let Some(histogram) = self.histogram.as_mut() else {
            return;
        };
        if histogram.id() == trigger {
            return;
        }
        if merged.has_primary() {
            histogram.draw_with_selection(&merged.selected);
        } else {
            histogram.clear_selection(&merged.selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use datamap_core::{HighlightTier, LayerKind, Rgba};
    use datamap_render::LayerProps;
    use HighlightTier::{Active, Dim, Hidden};

    #[derive(Default)]
    struct RecordingRenderer {
        updates: Vec<Vec<String>>,
        view: Option<ViewState>,
        font_missing: bool,
        tooltips: bool,
    }

    impl Renderer for RecordingRenderer {
        fn update_layers(&mut self, layers: &[LayerDescriptor]) {
            self.updates.push(layers.iter().map(|l| l.id.clone()).collect());
        }

        fn set_view_state(&mut self, view_state: &ViewState) {
            self.view = Some(*view_state);
        }

        fn is_font_available(&self, _font_family: &str) -> bool {
            !self.font_missing
        }

        fn set_tooltips_enabled(&mut self, enabled: bool) {
            self.tooltips = enabled;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum HistogramCall {
        Draw(Vec<usize>),
        Clear,
    }

    struct RecordingHistogram {
        calls: Arc<Mutex<Vec<HistogramCall>>>,
    }

    impl HistogramSink for RecordingHistogram {
        fn id(&self) -> &str {
            "histogram"
        }

        fn draw_with_selection(&mut self, selected: &IndexSet) {
            self.calls
                .lock()
                .unwrap()
                .push(HistogramCall::Draw(selected.iter().copied().collect()));
        }

        fn clear_selection(&mut self, _selected: &IndexSet) {
            self.calls.lock().unwrap().push(HistogramCall::Clear);
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn points(n: usize) -> Vec<DataPoint> {
        (0..n)
            .map(|i| DataPoint::new(i as f64, 0.0, Rgba::default()))
            .collect()
    }

    fn positions(map: &DataMap<RecordingRenderer>) -> Vec<Point> {
        map.points.iter().map(|p| p.position).collect()
    }

    fn map_with(n: usize, edges: Vec<Edge>) -> DataMap<RecordingRenderer> {
        init_logging();
        let mut map = DataMap::new(
            DataMapConfig::new([0.0, 10.0, -1.0, 1.0]),
            Viewport::new(800.0, 600.0).unwrap(),
            RecordingRenderer::default(),
        )
        .unwrap();
        map.add_points(points(n), PointStyle::default());
        let pos = positions(&map);
        map.add_edges(edges, &pos, EdgeStyle::default());
        map
    }

    #[test]
    fn test_invalid_construction_fails_fast() {
        let result = DataMap::new(
            DataMapConfig::new([1.0, 1.0, 0.0, 1.0]),
            Viewport::new(800.0, 600.0).unwrap(),
            RecordingRenderer::default(),
        );
        assert!(matches!(result, Err(DataMapError::View(_))));
    }

    #[test]
    fn test_initial_view_state_sent() {
        let map = map_with(2, Vec::new());
        let view = map.renderer().view.unwrap();
        assert!((view.longitude - 5.0).abs() < 1e-10);
        assert_eq!(view, map.view_state());
    }

    #[test]
    fn test_search_scenario_without_edges() {
        let mut map = map_with(5, Vec::new());
        map.add_selection(vec![2], "search");
        assert_eq!(map.highlight().points, vec![Dim, Dim, Active, Dim, Dim]);
        assert_eq!(map.selected_indices().into_iter().collect::<Vec<_>>(), vec![2]);

        map.remove_selection("search");
        assert_eq!(map.highlight().points, vec![Active; 5]);
        assert!(map.selected_indices().is_empty());
    }

    #[test]
    fn test_lasso_scenario_with_edges() {
        let mut map = map_with(4, vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)]);
        map.add_selection(vec![0], "lasso-selection");
        assert_eq!(map.highlight().points, vec![Active, Active, Hidden, Hidden]);
        assert_eq!(map.highlight().edges, vec![true, false]);
    }

    #[test]
    fn test_layers_pushed_in_render_order() {
        let mut map = map_with(3, vec![Edge::new(0, 1, 1.0)]);
        map.add_labels(
            (0..3).map(|i| Label::new(i as f64, 0.0, "x", 10.0)).collect(),
            LabelStyle::default(),
        );
        map.add_boundaries(Vec::new(), BoundaryStyle::default());
        map.add_selection(vec![0], "widget");

        let last = map.renderer().updates.last().unwrap();
        assert_eq!(
            last,
            &vec![
                "EdgeLayer",
                "ChevronLayer",
                "dataPointLayer",
                "boundaryLayer",
                "LabelLayer"
            ]
        );
    }

    #[test]
    fn test_version_bumps_once_per_pass_and_output_is_stable() {
        let mut map = map_with(4, vec![Edge::new(0, 1, 1.0)]);
        map.add_selection(vec![0, 3], "widget");
        let first_version = map.layer_version();
        let first = map.highlight().clone();
        let first_layers = map.layers().to_vec();

        map.add_selection(vec![0, 3], "widget");
        assert_eq!(map.layer_version(), first_version + 1);
        assert_eq!(map.highlight(), &first);
        for (a, b) in first_layers.iter().zip(map.layers()) {
            assert_eq!(a.props, b.props);
        }
    }

    #[test]
    fn test_point_layer_radius_emphasis() {
        let mut map = map_with(16, Vec::new());
        map.add_selection(vec![0, 1, 2, 3], "widget");
        let layer = map
            .layers()
            .iter()
            .find(|l| l.kind() == LayerKind::Points)
            .unwrap();
        let LayerProps::Points(props) = &layer.props else {
            panic!("expected point props");
        };
        assert!((props.radius_min_pixels - 2.0 * (0.2 + 1.0 / 1.5)).abs() < 1e-5);
        assert_eq!(props.filter.values[0], 1.0);
        assert_eq!(props.filter.values[4], -1.0);
    }

    #[test]
    fn test_search_uses_metadata_field() {
        let mut map = map_with(3, Vec::new());
        let meta = MetaData::new()
            .with_column("name", vec!["Apple".into(), "banana".into(), "PineApple".into()])
            .with_column(HOVER_TEXT_FIELD, vec!["a".into(), "b".into(), "c".into()]);
        map.add_meta_data(meta, MetaDataOptions::default().with_search_field("name"));
        assert!(map.renderer().tooltips);
        assert_eq!(map.tooltip(1), Some("b"));
        assert_eq!(map.tooltip_at(&Point::new(1.9, 0.2)), Some((2, "c")));

        map.search("APPLE");
        assert_eq!(
            map.selected_indices().into_iter().collect::<Vec<_>>(),
            vec![0, 2]
        );
        map.search("");
        assert!(map.selected_indices().is_empty());
        assert_eq!(map.highlight().points, vec![Active; 3]);
    }

    #[test]
    fn test_search_without_field_clears() {
        let mut map = map_with(3, Vec::new());
        map.add_selection(vec![1], "text-search");
        map.search("anything");
        assert!(map.selected_indices().is_empty());
    }

    #[test]
    fn test_lasso_select_polygon() {
        let mut map = map_with(5, Vec::new());
        map.lasso_select(&[
            Point::new(0.5, -1.0),
            Point::new(2.5, -1.0),
            Point::new(2.5, 1.0),
            Point::new(0.5, 1.0),
        ]);
        assert_eq!(
            map.selected_indices().into_iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(map.highlight().points, vec![Hidden, Active, Active, Hidden, Hidden]);

        map.lasso_select(&[]);
        assert!(map.selected_indices().is_empty());
    }

    #[test]
    fn test_histogram_notified_except_for_own_source() {
        let mut map = map_with(3, Vec::new());
        let calls = Arc::new(Mutex::new(Vec::new()));
        map.connect_histogram(Box::new(RecordingHistogram {
            calls: calls.clone(),
        }));

        map.add_selection(vec![1], "widget");
        map.add_selection(vec![2], "histogram");
        map.remove_selection("widget");
        map.remove_selection("histogram");

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                HistogramCall::Draw(vec![1]),
                HistogramCall::Draw(vec![2]),
            ]
        );

        map.add_selection(Vec::new(), "widget");
        assert_eq!(calls.lock().unwrap().last(), Some(&HistogramCall::Clear));
    }

    #[test]
    fn test_font_timeout_degrades() {
        let mut map = map_with(1, Vec::new());
        map.renderer_mut().font_missing = true;
        let style = LabelStyle {
            font_wait_ms: 10,
            font_poll_ms: 2,
            ..LabelStyle::default()
        };
        map.add_labels(vec![Label::new(0.0, 0.0, "only", 10.0)], style);
        let layer = map
            .layers()
            .iter()
            .find(|l| l.kind() == LayerKind::Labels)
            .unwrap();
        let LayerProps::Labels(props) = &layer.props else {
            panic!("expected label props");
        };
        assert!(!props.font_ready);
        assert_eq!(props.texts, vec!["only".to_string()]);
    }

    #[test]
    fn test_selection_before_layers_is_noop() {
        init_logging();
        let mut map = DataMap::new(
            DataMapConfig::default(),
            Viewport::new(100.0, 100.0).unwrap(),
            RecordingRenderer::default(),
        )
        .unwrap();
        map.add_selection(vec![0, 1], "widget");
        assert!(map.layers().is_empty());
        assert!(map.highlight().points.is_empty());
        assert!(map.selected_indices().is_empty());
    }

    #[test]
    fn test_json_loading() {
        let mut map = map_with(0, Vec::new());
        map.add_points_json(
            r#"{"x":[0,1,2],"y":[0,0,0],"r":[1,1,1],"g":[2,2,2],"b":[3,3,3],"a":[255,255,255]}"#,
            PointStyle::default(),
        )
        .unwrap();
        map.add_edges_json(
            r#"{"source_index":[0,null],"target_index":[2,1]}"#,
            EdgeStyle::default(),
        )
        .unwrap();
        map.add_selection(vec![0], "widget");
        assert_eq!(map.highlight().points, vec![Active, Dim, Active]);

        let err = map
            .add_points_json(r#"{"x":[0],"y":[]}"#, PointStyle::default())
            .unwrap_err();
        assert!(matches!(err, DataMapError::Load(_)));
    }

    #[test]
    fn test_frame_json() {
        let map = map_with(2, vec![Edge::new(0, 1, 1.0)]);
        let json = map.frame().to_json().unwrap();
        assert!(json.contains("dataPointLayer"));
        assert!(json.contains("EdgeLayer"));
    }
}
