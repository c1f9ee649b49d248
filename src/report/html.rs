//! HTML report generation with D3.js visualizations

use crate::model::Sentiment;
use crate::report::ReportContext;
use serde_json::json;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, ctx: &ReportContext<'_>) -> io::Result<()> {
    let json_data = build_json_data(ctx)?;
    let summary = &ctx.summary;

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>
        :root {{
            --bg: #f5f5f7;
            --card: #ffffff;
            --border: #d2d2d7;
            --text: #1d1d1f;
            --dim: #86868b;
            --negative: #ff3b30;
            --neutral: #8e8e93;
            --positive: #34c759;
            --accent: #007aff;
            --shadow: 0 2px 8px rgba(0,0,0,0.08), 0 1px 2px rgba(0,0,0,0.04);
            --shadow-hover: 0 4px 16px rgba(0,0,0,0.12), 0 2px 4px rgba(0,0,0,0.06);
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Helvetica Neue', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
            -webkit-font-smoothing: antialiased;
        }}
        .container {{ max-width: 1400px; margin: 0 auto; padding: 3rem 2rem; }}

        /* Header */
        .header {{
            display: flex;
            align-items: baseline;
            gap: 1rem;
            margin-bottom: 2.5rem;
            padding-bottom: 1.5rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{
            font-size: 2.25rem;
            font-weight: 700;
            letter-spacing: -0.02em;
            background: linear-gradient(135deg, #007aff 0%, #5856d6 50%, #af52de 100%);
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
            background-clip: text;
        }}
        .subtitle {{ color: var(--dim); font-size: 0.9375rem; }}
        .digest {{ color: var(--dim); font-family: 'SF Mono', Menlo, monospace; font-size: 0.75rem; margin-left: auto; }}

        /* Stats Row */
        .stats {{
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1.25rem;
            margin-bottom: 2.5rem;
        }}
        .stat {{
            background: var(--card);
            border-radius: 16px;
            padding: 1.75rem;
            text-align: center;
            box-shadow: var(--shadow);
        }}
        .stat-value {{ font-size: 2.75rem; font-weight: 600; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.8125rem; font-weight: 500; text-transform: uppercase; letter-spacing: 0.04em; margin-top: 0.5rem; }}
        .stat.negative .stat-value {{ color: var(--negative); }}

        /* Charts */
        .charts {{
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 1.5rem;
            margin-bottom: 2.5rem;
        }}
        .chart-card {{
            background: var(--card);
            border-radius: 16px;
            padding: 1.75rem;
            box-shadow: var(--shadow);
        }}
        .chart-title {{ font-size: 0.9375rem; font-weight: 600; margin-bottom: 1.25rem; }}
        .bar {{ cursor: pointer; }}
        .bar:hover {{ opacity: 0.8; }}
        .axis text {{ font-size: 11px; fill: var(--dim); }}
        .legend {{ display: flex; gap: 1.5rem; margin-top: 1rem; font-size: 0.8125rem; color: var(--dim); }}
        .legend-dot {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 0.4rem; }}

        /* Clusters */
        .clusters {{ display: grid; gap: 1rem; }}
        .cluster {{
            background: var(--card);
            border-radius: 16px;
            box-shadow: var(--shadow);
            overflow: hidden;
        }}
        .cluster.active {{ box-shadow: var(--shadow-hover); outline: 2px solid var(--accent); }}
        .cluster-head {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 1.25rem 1.5rem;
            cursor: pointer;
        }}
        .cluster-name {{ font-weight: 600; }}
        .cluster-meta {{ color: var(--dim); font-size: 0.8125rem; }}
        .cluster-body {{ display: none; padding: 0 1.5rem 1.5rem; }}
        .cluster.active .cluster-body {{ display: block; }}
        .quote {{
            border-left: 3px solid var(--negative);
            padding: 0.5rem 1rem;
            margin: 0.5rem 0;
            font-style: italic;
        }}
        table {{ width: 100%; border-collapse: collapse; margin-top: 1rem; }}
        th, td {{ padding: 0.6rem 0.75rem; text-align: left; font-size: 0.8125rem; }}
        th {{ color: var(--dim); text-transform: uppercase; font-size: 0.6875rem; letter-spacing: 0.06em; border-bottom: 1px solid var(--border); }}
        td {{ border-bottom: 1px solid rgba(0,0,0,0.06); }}
        .pill {{ padding: 0.2rem 0.5rem; border-radius: 6px; font-size: 0.6875rem; font-weight: 600; text-transform: uppercase; }}
        .pill.negative {{ background: rgba(255,59,48,0.12); color: #c9302c; }}
        .pill.neutral {{ background: rgba(142,142,147,0.12); color: #636366; }}
        .pill.positive {{ background: rgba(52,199,89,0.12); color: #1d8348; }}
        .empty {{ color: var(--dim); text-align: center; padding: 3rem; }}
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <div class="logo">{title}</div>
        <div class="subtitle">Affinity mapping of interview observations</div>
        <div class="digest">table {digest_short}</div>
    </div>

    <div class="stats">
        <div class="stat"><div class="stat-value">{observations}</div><div class="stat-label">Observations</div></div>
        <div class="stat"><div class="stat-value">{transcripts}</div><div class="stat-label">Interviews</div></div>
        <div class="stat"><div class="stat-value">{themes}</div><div class="stat-label">Themes</div></div>
        <div class="stat negative"><div class="stat-value">{negative_share:.0}%</div><div class="stat-label">Negative</div></div>
    </div>

    <div class="charts">
        <div class="chart-card">
            <div class="chart-title">Observations per theme</div>
            <div id="theme-chart"></div>
        </div>
        <div class="chart-card">
            <div class="chart-title">Sentiment by theme</div>
            <div id="sentiment-chart"></div>
            <div class="legend">
                <span><span class="legend-dot" style="background: var(--negative)"></span>Negative</span>
                <span><span class="legend-dot" style="background: var(--neutral)"></span>Neutral</span>
                <span><span class="legend-dot" style="background: var(--positive)"></span>Positive</span>
            </div>
        </div>
    </div>

    <div class="clusters" id="clusters"></div>
</div>

<script>
    const data = {json_data};
    const colors = {{ negative: '#ff3b30', neutral: '#8e8e93', positive: '#34c759' }};

    function escapeHtml(s) {{
        return s.replace(/[&<>"']/g, c => ({{ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }})[c]);
    }}

    function selectCluster(theme) {{
        d3.selectAll('.cluster').classed('active', d => d.theme === theme);
        const el = document.getElementById('cluster-' + data.clusters.findIndex(c => c.theme === theme));
        if (el) el.scrollIntoView({{ behavior: 'smooth', block: 'nearest' }});
    }}

    function themeChart() {{
        const width = document.getElementById('theme-chart').clientWidth || 560;
        const barHeight = 28;
        const margin = {{ top: 4, right: 48, bottom: 4, left: 200 }};
        const height = data.clusters.length * barHeight + margin.top + margin.bottom;
        const svg = d3.select('#theme-chart').append('svg').attr('width', width).attr('height', height);

        const x = d3.scaleLinear()
            .domain([0, d3.max(data.clusters, d => d.observation_count) || 1])
            .range([margin.left, width - margin.right]);
        const y = d3.scaleBand()
            .domain(data.clusters.map(d => d.theme))
            .range([margin.top, height - margin.bottom])
            .padding(0.2);

        svg.append('g').selectAll('rect').data(data.clusters).join('rect')
            .attr('class', 'bar')
            .attr('x', x(0))
            .attr('y', d => y(d.theme))
            .attr('width', d => x(d.observation_count) - x(0))
            .attr('height', y.bandwidth())
            .attr('rx', 4)
            .attr('fill', '#007aff')
            .on('click', (_, d) => selectCluster(d.theme));

        svg.append('g').selectAll('text').data(data.clusters).join('text')
            .attr('x', d => x(d.observation_count) + 6)
            .attr('y', d => y(d.theme) + y.bandwidth() / 2)
            .attr('dy', '0.35em')
            .attr('font-size', 11)
            .text(d => d.percentage.toFixed(1) + '%');

        svg.append('g').attr('class', 'axis')
            .attr('transform', `translate(${{margin.left}},0)`)
            .call(d3.axisLeft(y).tickSize(0))
            .call(g => g.select('.domain').remove());
    }}

    function sentimentChart() {{
        const width = document.getElementById('sentiment-chart').clientWidth || 560;
        const barHeight = 28;
        const margin = {{ top: 4, right: 16, bottom: 4, left: 200 }};
        const height = data.clusters.length * barHeight + margin.top + margin.bottom;
        const svg = d3.select('#sentiment-chart').append('svg').attr('width', width).attr('height', height);
        const keys = data.sentiments;

        const rows = data.clusters.map(c => ({{
            theme: c.theme,
            negative: c.sentiment_negative / (c.observation_count || 1),
            neutral: c.sentiment_neutral / (c.observation_count || 1),
            positive: c.sentiment_positive / (c.observation_count || 1),
        }}));
        const series = d3.stack().keys(keys)(rows);

        const x = d3.scaleLinear().domain([0, 1]).range([margin.left, width - margin.right]);
        const y = d3.scaleBand()
            .domain(rows.map(d => d.theme))
            .range([margin.top, height - margin.bottom])
            .padding(0.2);

        svg.append('g').selectAll('g').data(series).join('g')
            .attr('fill', d => colors[d.key])
            .selectAll('rect').data(d => d).join('rect')
            .attr('class', 'bar')
            .attr('x', d => x(d[0]))
            .attr('y', d => y(d.data.theme))
            .attr('width', d => x(d[1]) - x(d[0]))
            .attr('height', y.bandwidth())
            .on('click', (_, d) => selectCluster(d.data.theme));

        svg.append('g').attr('class', 'axis')
            .attr('transform', `translate(${{margin.left}},0)`)
            .call(d3.axisLeft(y).tickSize(0))
            .call(g => g.select('.domain').remove());
    }}

    function clusterList() {{
        const container = d3.select('#clusters');
        if (data.clusters.length === 0) {{
            container.append('div').attr('class', 'empty').text('No observations.');
            return;
        }}

        const cluster = container.selectAll('.cluster').data(data.clusters).join('div')
            .attr('class', 'cluster')
            .attr('id', (_, i) => 'cluster-' + i);

        const head = cluster.append('div').attr('class', 'cluster-head')
            .on('click', (_, d) => {{
                const active = d3.select('#cluster-' + data.clusters.indexOf(d)).classed('active');
                d3.selectAll('.cluster').classed('active', false);
                if (!active) selectCluster(d.theme);
            }});
        head.append('div').attr('class', 'cluster-name').text(d => d.theme);
        head.append('div').attr('class', 'cluster-meta')
            .text(d => `${{d.observation_count}} observations · ${{d.sentiment_negative}} negative · ${{d.sentiment_neutral}} neutral · ${{d.sentiment_positive}} positive`);

        const body = cluster.append('div').attr('class', 'cluster-body');
        body.selectAll('.quote').data(d => d.sample_quotes).join('div')
            .attr('class', 'quote')
            .text(d => '"' + d + '"');

        body.append('table').html(d => {{
            const rows = data.observations
                .filter(o => o.theme === d.theme)
                .map(o => `<tr><td>${{escapeHtml(o.text)}}</td><td>${{escapeHtml(o.interview_id)}}</td><td><span class="pill ${{o.sentiment}}">${{o.sentiment}}</span></td></tr>`)
                .join('');
            return '<tr><th>Observation</th><th>Interview</th><th>Sentiment</th></tr>' + rows;
        }});
    }}

    themeChart();
    sentimentChart();
    clusterList();
    </script>
</body>
</html>
"#,
        title = html_escape(&ctx.options.title),
        digest_short = &ctx.digest[..12.min(ctx.digest.len())],
        observations = summary.observations,
        transcripts = summary.transcripts,
        themes = summary.themes,
        negative_share = summary.negative_share,
        json_data = json_data
    )?;

    Ok(())
}

fn build_json_data(ctx: &ReportContext<'_>) -> io::Result<String> {
    let data = json!({
        "summary": {
            "total": ctx.summary.observations,
            "transcripts": ctx.summary.transcripts,
            "themes": ctx.summary.themes,
            "negative": ctx.summary.negative,
        },
        "sentiments": Sentiment::ALL.iter().map(|s| s.label()).collect::<Vec<_>>(),
        "clusters": ctx.clusters,
        "observations": ctx.observations,
    });
    let json = serde_json::to_string(&data)?;
    // keep "</script>" inside a quote from closing the script element
    Ok(json.replace("</", "<\\/"))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, Theme};
    use crate::report::ReportOptions;

    fn render(observations: &[Observation], options: &ReportOptions) -> String {
        let mut out = Vec::new();
        write(&mut out, &ReportContext::new(observations, options)).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn rows() -> Vec<Observation> {
        vec![
            Observation {
                text: "The app showed </script><b>15 overdue</b> items".to_string(),
                source_id: "interview_04".to_string(),
                theme: Theme::ProductivityGuilt,
                sentiment: Sentiment::Negative,
            },
            Observation {
                text: "I love that it stays out of my way".to_string(),
                source_id: "interview_05".to_string(),
                theme: Theme::Other,
                sentiment: Sentiment::Positive,
            },
        ]
    }

    #[test]
    fn test_embeds_clusters_and_observations() {
        let html = render(&rows(), &ReportOptions::default());
        assert!(html.contains("\"theme\":\"Productivity Guilt\""));
        assert!(html.contains("\"interview_id\":\"interview_05\""));
        assert!(html.contains("\"sample_quotes\""));
        assert!(html.contains("<title>Affinity Map</title>"));
    }

    #[test]
    fn test_script_breakout_escaped() {
        let html = render(&rows(), &ReportOptions::default());
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("<\\/script><b>15 overdue<\\/b>"));
    }

    #[test]
    fn test_title_escaped() {
        let options = ReportOptions {
            title: "Q4 <Research>".to_string(),
            ..ReportOptions::default()
        };
        let html = render(&rows(), &options);
        assert!(html.contains("<title>Q4 &lt;Research&gt;</title>"));
    }

    #[test]
    fn test_empty_report_renders() {
        let html = render(&[], &ReportOptions::default());
        assert!(html.contains("\"clusters\":[]"));
        assert!(html.contains("No observations."));
    }

    #[test]
    fn test_output_is_deterministic() {
        let options = ReportOptions::default();
        assert_eq!(render(&rows(), &options), render(&rows(), &options));
    }

    #[test]
    fn test_sentiment_keys_drive_stack() {
        let html = render(&rows(), &ReportOptions::default());
        assert!(html.contains(r#""sentiments":["negative","neutral","positive"]"#));
        assert!(html.contains("const keys = data.sentiments;"));
        assert!(!html.contains("theme_order"));
    }
}
