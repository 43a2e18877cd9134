use super::Snapshot;
use super::chunks::Chunks;
use super::pieces::{Part, Pieces};

const VIEWPORT: &str = "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, user-scalable=yes\">";

const DASHBOARD_HEAD: &str = "<html>\n<head>\n<title>Smoky</title>\n\
<script type=\"text/javascript\" src=\"https://www.google.com/jsapi?autoload={'modules':[{'name':'visualization','version':'1','packages':['gauge']}]}\"></script>\n\
<script type=\"text/javascript\">\nvar temp=";

const DASHBOARD_SCRIPT: &str = "google.setOnLoadCallback(drawGauges);\n\
var tempOptions = {min: -20, max: 400, yellowFrom: -20, yellowTo: 150, redFrom: 300, redTo: 400, minorTicks: 10, majorTicks: ['50','100','150','200','250','300','350','400']};\n\
var setOptions = {min: 0, max: 400, yellowFrom: 0, yellowTo: 175, redFrom: 325, redTo: 400, minorTicks: 10, majorTicks: ['50','100','150','200','250','300','350','400']};\n\
function drawGauge(id, title, value, options) {\n\
var data = new google.visualization.DataTable();\n\
data.addColumn('number', title);\ndata.addRows(1);\ndata.setCell(0, 0, value);\n\
new google.visualization.Gauge(document.getElementById(id)).draw(data, options);\n}\n\
function drawGauges() {\ndrawGauge('gauge_temp', '\\u00B0F', temp, tempOptions);\ndrawGauge('gauge_set', 'S \\u00B0F', setP, setOptions);\n}\n\
</script>\n</head>\n<body bgcolor=\"#d0d0f0\">";

const DASHBOARD_TITLE: &str = "<h1>Smoky</h1>Smoker regulator<BR><BR><FONT SIZE=+1>Last measurement: ";

const DASHBOARD_BODY: &str = "<BR>\n\
<div id=\"gauge_temp\" style=\"float:left; width:160px; height: 160px;\"></div>\n\
<div id=\"gauge_set\" style=\"float:left; width:160px; height: 160px;\"></div>\n\
<div style=\"clear:both;\"></div>\
<p>Temperature pages:<BR><a href=\"/grafik\">Chart</a> <a href=\"/tabelle\">Table</a></p>";

const TABLE_HEAD: &str = "<html><head><title>Smoker temperature log</title></head><body bgcolor=\"#b0b0b0\">";

const TABLE_TITLE: &str = "<h1>Smoker temperature log</h1><FONT SIZE=+1><a href=\"/\">Dashboard</a><BR><BR>Recent measurements every ";

const TABLE_INTERVAL_UNIT: &str = " ms<BR>";

const CHART_HEAD: &str = "<html>\n<head>\n<title>Smoker temperature chart</title>\n\
<script type=\"text/javascript\" src=\"https://www.google.com/jsapi?autoload={'modules':[{'name':'visualization','version':'1','packages':['corechart']}]}\"></script>\n\
<script type=\"text/javascript\">google.setOnLoadCallback(drawChart);\n\
function drawChart() {var data = google.visualization.arrayToDataTable([\n\
['Time / UTC', 'Temperature', 'Set temperature'],\n";

const CHART_TAIL: &str = "]);\n\
var options = {title: 'Temperature',vAxes:{0:{viewWindowMode:'explicit',gridlines:{color:'black'},format:'##.##\\u00B0F'},1:{gridlines:{color:'transparent'},format:'##.##\\u00B0F'}},\
series:{0:{targetAxisIndex:0},1:{targetAxisIndex:1}},curveType:'none',legend:{position:'bottom'}};\n\
new google.visualization.LineChart(document.getElementById('curve_chart')).draw(data, options);}\n\
</script>\n</head>\n<body bgcolor=\"#d0d0f0\">";

const CHART_BODY: &str = "<h1>Smoker temperature chart</h1><a href=\"/\">Dashboard</a><BR><BR>\n\
<div id=\"curve_chart\" style=\"width: 600px; height: 400px\"></div>";

pub(crate) const NOT_FOUND: &str = "<html><head><title>404 Not Found</title></head><body><h1>Not Found</h1><p>The requested URL was not found on this server.</p></body></html>";

const DASHBOARD: &[Part] = &[
    Part::Text(DASHBOARD_HEAD),
    Part::GaugeValues,
    Part::Text(DASHBOARD_SCRIPT),
    Part::Text(VIEWPORT),
    Part::Text(DASHBOARD_TITLE),
    Part::LatestTime,
    Part::Text(DASHBOARD_BODY),
    Part::Footer,
];

const TABLE: &[Part] = &[
    Part::Text(TABLE_HEAD),
    Part::Text(VIEWPORT),
    Part::Text(TABLE_TITLE),
    Part::Interval,
    Part::Text(TABLE_INTERVAL_UNIT),
    Part::TableRows,
    Part::Footer,
];

const CHART: &[Part] = &[
    Part::Text(CHART_HEAD),
    Part::ChartRows,
    Part::Text(CHART_TAIL),
    Part::Text(VIEWPORT),
    Part::Text(CHART_BODY),
    Part::Footer,
];

const MISSING: &[Part] = &[Part::Text(NOT_FOUND)];

/// The complete pages served over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Gauges for the current temperature and set-point
    Dashboard,
    /// Measurement history as an HTML table
    Table,
    /// Measurement history as a line chart
    Chart,
    NotFound,
}

impl Page {
    pub(crate) fn parts(self) -> &'static [Part] {
        match self {
            Self::Dashboard => DASHBOARD,
            Self::Table => TABLE,
            Self::Chart => CHART,
            Self::NotFound => MISSING,
        }
    }

    pub fn chunks<'a>(self, snapshot: &'a Snapshot<'a>) -> Chunks<'a> {
        Chunks::new(Pieces::new(self.parts(), snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Counters;
    use crate::logger::Readings;
    use crate::report::{emit, measure};
    use crate::storage::MeasurementStore;
    use crate::test_support::{VecSink, filled_store};

    fn render(page: Page, store: &MeasurementStore) -> String {
        let snapshot = Snapshot::new(store, Readings::new(180.5, 225.0), Counters::default(), 1234);
        let mut sink = VecSink::default();
        let written = emit(page.chunks(&snapshot), &mut sink).unwrap();

        assert_eq!(measure(page.chunks(&snapshot)), written, "{:?}", page);
        String::from_utf8(sink.bytes).unwrap()
    }

    #[test]
    fn test_dashboard_shows_latest_record() {
        let store = filled_store(8, 3);
        let html = render(Page::Dashboard, &store);

        assert!(html.contains("var temp=2.00,setP=225.00;\n"));
        assert!(html.contains("Last measurement: 22:13:23 - 14.11.2023 UTC"));
        assert!(html.contains("<a href=\"/grafik\">"));
        assert!(html.contains("<a href=\"/tabelle\">"));
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_dashboard_without_records_uses_live_reading() {
        let store = MeasurementStore::disabled();
        let html = render(Page::Dashboard, &store);

        assert!(html.contains("var temp=180.50,setP=225.00;\n"));
        assert!(html.contains("Last measurement: no data yet"));
    }

    #[test]
    fn test_table_page_states_interval() {
        let store = filled_store(8, 2);
        let html = render(Page::Table, &store);

        assert!(html.contains("Recent measurements every 1000 ms<BR><style>"));
        assert!(html.contains("Max. data points=8<BR>"));
    }

    #[test]
    fn test_chart_page_wraps_rows() {
        let store = filled_store(8, 2);
        let html = render(Page::Chart, &store);

        let header = html.find("['Time / UTC'").unwrap();
        let first = html.find("['22:13:21 - 14.11.2023',0.00,225.00],\n").unwrap();
        let tail = html.find("]);\n").unwrap();
        assert!(header < first && first < tail);
    }

    #[test]
    fn test_not_found_is_static() {
        let store = filled_store(8, 2);

        assert_eq!(render(Page::NotFound, &store), NOT_FOUND);
    }
}
