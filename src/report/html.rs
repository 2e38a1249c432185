//! HTML page generation with Chart.js visualizations

use crate::chart::cards::MetricCard;
use crate::chart::spec::ChartSpec;
use crate::chart::surface;
use crate::chart::svg::{escape, SvgSize};
use crate::error::Result;
use crate::evidence::EvidenceRecord;
use crate::report::Site;
use crate::sources::{
    checklist_text, group_sources, source_count, split_checklists, CopyState, EvidencePackAction, Source,
    VerifyStep, COPY_STATUS_MS, LIVE_MESSAGE_MS,
};
use crate::table::chips::{Chip, ChipAction, Fragment};
use crate::table::csv::{header_line, row_line, CSV_FILENAME};
use crate::table::{
    header_chips, render_view, sort_order, RowView, SortDir, SortKey, TableInput, TableOptions, TableState,
    TableView, EMPTY_MESSAGE,
};
use serde_json::json;
use std::io::Write;

pub fn write<W: Write>(writer: &mut W, site: &Site) -> Result<()> {
    let counts = site.counts();
    let state = site.table_state();
    let specs = site.chart_specs();

    let chips: String = header_chips(&counts, state.sortable).iter().map(render_chip).collect();
    let pack = render_evidence_pack(&site.evidence_pack);

    let mut cards = String::new();
    for (card, spec) in site.cards.iter().zip(&specs) {
        cards.push_str(&render_card(card, spec)?);
    }

    let input = TableInput { rows: Some(&site.records), ..Default::default() };
    let table = render_table(&render_view(&input, &state, &site.table), &state, &site.table);
    let sources = render_sources(&site.sources, &site.verify_steps);

    // Build JSON data for the page script
    let json_data = build_json_data(site, &specs)?;

    // Write the full HTML document
    write!(writer, r#"<!DOCTYPE html>
<html lang="en-GB">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js" defer></script>
    <style>
        :root {{
            --bg: #f0f4f5;
            --card: #ffffff;
            --border: #d8dde0;
            --text: #1f2937;
            --dim: #4c6272;
            --nhs: #005eb8;
            --up: #b45309;
            --up-bg: #fef3c7;
            --down: #047857;
            --down-bg: #d1fae5;
            --steady: #374151;
            --steady-bg: #e5e7eb;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: system-ui, -apple-system, 'Segoe UI', Roboto, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 2rem; }}
        .sr-only {{
            position: absolute; width: 1px; height: 1px; padding: 0; margin: -1px;
            overflow: hidden; clip: rect(0, 0, 0, 0); white-space: nowrap; border: 0;
        }}

        /* Header */
        .header {{
            display: flex;
            flex-wrap: wrap;
            align-items: center;
            justify-content: space-between;
            gap: 1rem;
            margin-bottom: 1.5rem;
            padding-bottom: 1rem;
            border-bottom: 2px solid var(--nhs);
        }}
        .header h1 {{ font-size: 1.75rem; color: var(--nhs); }}
        .timestamp {{ color: var(--dim); font-size: 0.8rem; }}
        .summary-line {{ font-size: 1.05rem; margin-bottom: 1rem; }}
        .chips {{ display: flex; flex-wrap: wrap; gap: 0.5rem; margin-bottom: 1.5rem; }}
        .chip {{
            display: inline-flex; align-items: center; gap: 0.25rem;
            padding: 0.25rem 0.75rem; border-radius: 999px;
            font-size: 0.85rem; font-weight: 600; border: 1px solid transparent;
            text-decoration: none; cursor: default;
        }}
        a.chip, button.chip {{ cursor: pointer; border-color: currentColor; background: transparent; font: inherit; font-size: 0.85rem; font-weight: 600; }}
        .tone-up {{ color: var(--up); background: var(--up-bg); }}
        .tone-down {{ color: var(--down); background: var(--down-bg); }}
        .tone-steady {{ color: var(--steady); background: var(--steady-bg); }}
        .pack {{
            padding: 0.5rem 1rem; border-radius: 6px; font-weight: 600;
            background: var(--nhs); color: #fff; text-decoration: none; border: none;
        }}
        .pack[disabled] {{ background: var(--steady-bg); color: var(--dim); cursor: not-allowed; }}

        /* Cards */
        .cards {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(340px, 1fr)); gap: 1rem; margin-bottom: 2rem; }}
        .card {{ background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.25rem; }}
        .kpi-label {{ font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--dim); }}
        .kpi-value {{ font-size: 2rem; font-weight: 800; color: var(--nhs); }}
        .kpi-detail {{ color: var(--dim); font-size: 0.85rem; }}
        .card p {{ margin: 0.75rem 0; }}
        .chart-box {{ position: relative; height: 220px; margin: 0.75rem 0; }}
        .chart-box canvas {{ display: none; }}
        .chart-box.live canvas {{ display: block; }}
        .chart-box.live .chart-fallback {{ display: none; }}
        .chart-fallback svg {{ width: 100%; height: 100%; }}
        .card details {{ font-size: 0.85rem; margin: 0.5rem 0; }}
        .card dl {{ display: grid; grid-template-columns: auto 1fr; gap: 0.25rem 0.75rem; margin-top: 0.5rem; }}
        .card dt {{ color: var(--dim); }}
        .period-note {{ font-size: 0.75rem; color: var(--dim); }}
        .card-sources {{ font-size: 0.75rem; margin-top: 0.5rem; }}
        .card-sources a {{ color: var(--nhs); }}

        /* Evidence table */
        .section {{ background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.25rem; margin-bottom: 2rem; }}
        .section h2 {{ font-size: 1.25rem; margin-bottom: 0.75rem; }}
        .toolbar {{ display: flex; flex-wrap: wrap; gap: 0.75rem; align-items: center; margin-bottom: 0.75rem; }}
        .toolbar input {{ flex: 1; min-width: 200px; padding: 0.5rem 0.75rem; border: 1px solid var(--border); border-radius: 6px; font: inherit; }}
        .toolbar button {{ padding: 0.5rem 1rem; border: 1px solid var(--nhs); border-radius: 6px; background: #fff; color: var(--nhs); font: inherit; font-weight: 600; cursor: pointer; }}
        .meta {{ font-size: 0.8rem; color: var(--dim); margin-bottom: 0.75rem; }}
        table {{ width: 100%; border-collapse: collapse; font-size: 0.9rem; }}
        th, td {{ padding: 0.75rem; text-align: left; vertical-align: top; border-bottom: 1px solid var(--border); }}
        thead th {{ background: #e8edee; font-weight: 600; white-space: nowrap; }}
        thead th button {{ background: none; border: none; font: inherit; font-weight: 600; cursor: pointer; color: inherit; }}
        th[aria-sort="ascending"] .sort-ind::after {{ content: ' ▲'; }}
        th[aria-sort="descending"] .sort-ind::after {{ content: ' ▼'; }}
        tr.group-row th {{ background: #f7f9fa; color: var(--nhs); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.04em; }}
        tr.striped td {{ background: #fafbfb; }}
        tr.highlight td {{ box-shadow: inset 0 0 0 2px var(--nhs); }}
        td.col-medway {{ background: rgba(0, 94, 184, 0.05); font-weight: 600; }}
        table.compact th, table.compact td {{ padding: 0.4rem 0.5rem; }}
        .badge {{ display: inline-block; padding: 0 0.35rem; border-radius: 4px; background: #e0ecf8; color: var(--nhs); font-weight: 700; }}
        .arrow {{ color: var(--dim); padding: 0 0.15rem; }}
        .pill {{ display: inline-block; margin: 0.25rem 0.25rem 0 0; padding: 0 0.5rem; border-radius: 999px; font-size: 0.75rem; }}
        .pill.period {{ background: var(--steady-bg); color: var(--dim); }}
        .table-empty, .table-error {{ padding: 1rem; color: var(--dim); }}
        .table-error {{ color: #b91c1c; }}
        .skeleton td span {{ display: block; height: 0.8rem; border-radius: 4px; background: #e5e7eb; }}
        .footer-note {{ font-size: 0.8rem; color: var(--dim); margin-top: 0.75rem; }}

        /* Sources & methods */
        .source-group {{ margin-bottom: 1rem; }}
        .source-group h3 {{ font-size: 1rem; margin-bottom: 0.5rem; }}
        .source-list {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 0.5rem; }}
        .source-card {{ display: block; padding: 0.75rem; border: 1px solid var(--border); border-radius: 8px; color: inherit; text-decoration: none; }}
        a.source-card:hover {{ border-color: var(--nhs); }}
        .source-card .tag {{ font-size: 0.7rem; font-weight: 700; color: var(--nhs); }}
        .source-card .host, .source-card .ref {{ font-size: 0.75rem; color: var(--dim); }}
        .checklists {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1rem; margin-top: 1rem; }}
        .check-item {{ margin-bottom: 0.75rem; }}
        .check-item ol {{ margin-left: 1.25rem; font-size: 0.9rem; }}
        .check-count {{ font-size: 0.75rem; color: var(--dim); }}
        .manual-copy {{ width: 100%; min-height: 10rem; margin-top: 0.5rem; font-family: monospace; font-size: 0.8rem; }}
    </style>
</head>
<body>
<div class="container">
    <header class="header">
        <div>
            <h1>{title}</h1>
            <div class="timestamp">Generated {generated}</div>
        </div>
        {pack}
    </header>

    <p class="summary-line">{summary}</p>
    <div class="chips">{chips}</div>

    <section class="cards" aria-label="Cost comparisons">
{cards}
    </section>

{table}

{sources}
</div>

<div class="sr-only" id="live" role="status" aria-live="polite"></div>

<script type="application/json" id="site-data">{json_data}</script>
<script>
(function () {{
    const data = JSON.parse(document.getElementById('site-data').textContent);
    const live = document.getElementById('live');

    function announce(text) {{
        live.textContent = text;
    }}

    // ---- Evidence table ----
    const table = document.getElementById('evidence-table');
    const tbody = table ? table.querySelector('tbody') : null;
    const emptyEl = document.getElementById('table-empty');
    const state = {{ sortBy: 'domain', sortDir: 'asc', query: '' }};
    const rowEls = {{}};
    const headerEls = {{}};
    if (tbody) {{
        tbody.querySelectorAll('tr.row').forEach(tr => {{ rowEls[tr.dataset.index] = tr; }});
        tbody.querySelectorAll('tr.group-row').forEach(tr => {{ headerEls[tr.dataset.group] = tr; }});
    }}

    function visibleOrder() {{
        const q = state.query.trim().toLowerCase();
        const order = data.order[state.sortBy + ':' + state.sortDir] || [];
        return order.filter(i => rowEls[i] && (!q || rowEls[i].dataset.search.includes(q)));
    }}

    function renderTable() {{
        if (!tbody) return;
        const order = visibleOrder();
        Object.values(rowEls).forEach(tr => {{ tr.hidden = true; }});
        Object.values(headerEls).forEach(tr => {{ tr.hidden = true; }});
        let prev = null;
        order.forEach((i, n) => {{
            const group = data.groups[i];
            if (group !== prev && headerEls[group]) {{
                headerEls[group].hidden = false;
                tbody.appendChild(headerEls[group]);
                prev = group;
            }}
            const tr = rowEls[i];
            tr.hidden = false;
            tr.classList.toggle('striped', n % 2 === 1);
            tbody.appendChild(tr);
        }});
        table.hidden = order.length === 0;
        if (emptyEl) emptyEl.hidden = order.length > 0;

        table.querySelectorAll('th[data-sort]').forEach(th => {{
            const key = th.dataset.sort;
            const active = key === state.sortBy;
            th.setAttribute('aria-sort', active ? (state.sortDir === 'asc' ? 'ascending' : 'descending') : 'none');
            const hint = (!active || state.sortDir === 'desc') ? 'activate to sort ascending' : 'activate to sort descending';
            const btn = th.querySelector('button');
            if (btn) btn.setAttribute('aria-label', data.labels[key] + ', ' + hint);
        }});
    }}

    function sortBy(key, dir) {{
        if (!data.sortable) return;
        if (dir) {{
            state.sortBy = key;
            state.sortDir = dir;
        }} else if (state.sortBy === key) {{
            state.sortDir = state.sortDir === 'asc' ? 'desc' : 'asc';
        }} else {{
            state.sortBy = key;
            state.sortDir = 'asc';
        }}
        renderTable();
        announce('Sorted by ' + data.labels[state.sortBy] + ' ' + state.sortDir);
    }}

    document.querySelectorAll('th[data-sort] button').forEach(btn => {{
        btn.addEventListener('click', () => sortBy(btn.parentElement.dataset.sort));
    }});
    document.querySelectorAll('[data-sort-chip]').forEach(btn => {{
        btn.addEventListener('click', () => sortBy(btn.dataset.sortChip, 'asc'));
    }});
    const search = document.getElementById('table-search');
    if (search) {{
        search.addEventListener('input', () => {{
            state.query = search.value;
            renderTable();
        }});
    }}

    function downloadCsv() {{
        const lines = [data.csv.header].concat(visibleOrder().map(i => data.csv.rows[i]));
        const blob = new Blob(['\ufeff' + lines.join('\n') + '\n'], {{ type: 'text/csv;charset=utf-8;' }});
        const url = URL.createObjectURL(blob);
        const a = document.createElement('a');
        a.href = url;
        a.download = data.csv.filename;
        document.body.appendChild(a);
        a.click();
        a.remove();
        setTimeout(() => URL.revokeObjectURL(url), 1000);
    }}
    const csvBtn = document.getElementById('csv-download');
    if (csvBtn) csvBtn.addEventListener('click', downloadCsv);

    // ---- Charts ----
    const charts = {{}};

    function formatValue(unit, v) {{
        if (unit === 'percent') {{
            let s = (v === 0 ? 0 : v).toFixed(1);
            if (s.endsWith('.0')) s = s.slice(0, -2);
            return s + '%';
        }}
        const whole = Math.round(Math.abs(v));
        return (v < 0 && whole !== 0 ? '-' : '') + '£' + whole.toLocaleString('en-GB');
    }}

    const endLabelPlugin = {{
        id: 'endLabels',
        afterDatasetsDraw(chart, args, opts) {{
            if (!opts || !opts.enabled) return;
            const {{ ctx, chartArea }} = chart;
            const meta = chart.getDatasetMeta(0);
            ctx.save();
            ctx.font = opts.font;
            ctx.fillStyle = opts.color;
            ctx.textBaseline = 'middle';
            meta.data.forEach((bar, i) => {{
                const text = opts.text[i];
                if (text == null) return;
                const w = ctx.measureText(text).width;
                let x = Math.min(bar.x + opts.padding, chartArea.right - w - 2);
                x = Math.max(x, chartArea.left + 2);
                ctx.fillText(text, x, bar.y);
            }});
            ctx.restore();
        }}
    }};

    function bindChart(spec) {{
        const canvas = document.getElementById('chart-' + spec.id);
        if (!canvas || !window.Chart) return;
        if (charts[spec.id]) {{
            charts[spec.id].destroy();
            delete charts[spec.id];
        }}
        const options = JSON.parse(JSON.stringify(spec.options));
        const valueAxis = options.indexAxis === 'y' ? 'x' : 'y';
        options.scales[valueAxis].ticks.callback = v => formatValue(spec.unit, v);
        options.plugins.tooltip.callbacks = {{ label: item => spec.tooltips[item.dataIndex] }};
        options.plugins.endLabels = spec.endLabels;
        charts[spec.id] = new Chart(canvas, {{
            type: spec.type,
            data: spec.data,
            options: options,
            plugins: [endLabelPlugin]
        }});
        canvas.parentElement.classList.add('live');
    }}

    window.addEventListener('load', () => data.charts.forEach(bindChart));

    // ---- Sources & methods ----
    const sourceSearch = document.getElementById('source-search');
    const sourceCount = document.getElementById('source-count');
    const sourcesEmpty = document.getElementById('sources-empty');

    function filterSources() {{
        const q = sourceSearch.value.trim().toLowerCase();
        let total = 0;
        document.querySelectorAll('.source-group').forEach(group => {{
            let shown = 0;
            group.querySelectorAll('.source-card').forEach(card => {{
                const hit = !q || card.dataset.search.includes(q);
                card.hidden = !hit;
                if (hit) shown += 1;
            }});
            group.hidden = shown === 0;
            total += shown;
        }});
        document.querySelectorAll('.check-item').forEach(item => {{
            item.hidden = !!q && !item.dataset.domain.includes(q);
        }});
        sourceCount.textContent = total + (total === 1 ? ' source' : ' sources');
        sourcesEmpty.hidden = total > 0;
    }}
    if (sourceSearch) sourceSearch.addEventListener('input', filterSources);

    const copyBtn = document.getElementById('copy-checklist');
    const copyLive = document.getElementById('copy-live');
    const manual = document.getElementById('manual-copy');
    let statusTimer = null;
    let liveTimer = null;

    function setCopyState(s) {{
        copyBtn.textContent = data.copy.labels[s];
        copyLive.textContent = data.copy.messages[s];
        if (s === 'failed') {{
            manual.hidden = false;
            manual.select();
        }} else if (s === 'copied') {{
            manual.hidden = true;
        }}
        clearTimeout(statusTimer);
        clearTimeout(liveTimer);
        if (s !== 'idle') {{
            statusTimer = setTimeout(() => {{ copyBtn.textContent = data.copy.labels.idle; }}, data.copy.statusMs);
            liveTimer = setTimeout(() => {{ copyLive.textContent = ''; }}, data.copy.liveMs);
        }}
    }}

    async function copyChecklist() {{
        const text = data.checklist;
        let ok = false;
        try {{
            if (navigator.clipboard && window.isSecureContext) {{
                await navigator.clipboard.writeText(text);
                ok = true;
            }}
        }} catch (e) {{
            ok = false;
        }}
        if (!ok) {{
            try {{
                const ta = document.createElement('textarea');
                ta.value = text;
                ta.setAttribute('readonly', '');
                ta.style.position = 'absolute';
                ta.style.left = '-9999px';
                document.body.appendChild(ta);
                ta.select();
                ok = document.execCommand('copy');
                ta.remove();
            }} catch (e) {{
                ok = false;
            }}
        }}
        setCopyState(ok ? 'copied' : 'failed');
    }}
    if (copyBtn) copyBtn.addEventListener('click', copyChecklist);
}})();
</script>
</body>
</html>
"#,
        title = escape(&site.title),
        generated = escape(&site.generated),
        pack = pack,
        summary = escape(counts.summary_line()),
        chips = chips,
        cards = cards,
        table = table,
        sources = sources,
        json_data = json_data
    )?;

    Ok(())
}

/// Display-only chips are spans; interactive chips are links or buttons.
fn render_chip(chip: &Chip) -> String {
    match chip {
        Chip::Static { label, tone } => {
            format!(r#"<span class="chip {}">{}</span>"#, tone.css_class(), escape(label))
        }
        Chip::Interactive { label, tone, action: ChipAction::Link(href) } => format!(
            r#"<a class="chip {}" href="{}">{}</a>"#,
            tone.css_class(),
            escape(href),
            escape(label)
        ),
        Chip::Interactive { label, tone, action: ChipAction::Sort(key) } => format!(
            r#"<button type="button" class="chip {}" data-sort-chip="{}">{}</button>"#,
            tone.css_class(),
            key,
            escape(label)
        ),
    }
}

fn render_evidence_pack(action: &EvidencePackAction) -> String {
    match action {
        EvidencePackAction::Link(url) => format!(
            r#"<a class="pack" href="{}" download>{}</a>"#,
            escape(url),
            action.title()
        ),
        EvidencePackAction::Disabled => format!(
            r#"<button type="button" class="pack" disabled title="{0}">{0}</button>"#,
            action.title()
        ),
    }
}

fn render_fragments(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|f| match f {
            Fragment::Text(t) => escape(t),
            Fragment::Badge(t) => format!(r#"<span class="badge">{}</span>"#, escape(t)),
            Fragment::Arrow => r#"<span class="arrow" aria-hidden="true">→</span>"#.to_string(),
        })
        .collect()
}

fn render_card(card: &MetricCard, spec: &ChartSpec) -> Result<String> {
    let svg = surface::render_svg(spec, SvgSize::default())?;
    let gap = card
        .gap()
        .map(|g| format!(r#"<span class="chip {}">{}</span>"#, g.tone.css_class(), escape(&g.text)))
        .unwrap_or_default();

    let details = if card.details.is_empty() {
        String::new()
    } else {
        let rows: String = card
            .details
            .iter()
            .map(|(k, v)| format!("<dt>{}</dt><dd>{}</dd>", escape(k), escape(v)))
            .collect();
        format!("<details><summary>Details</summary><dl>{}</dl></details>", rows)
    };

    let links: Vec<String> = card
        .sources
        .iter()
        .map(|s| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escape(&s.url),
                escape(&s.label)
            )
        })
        .collect();

    Ok(format!(
        r#"        <article class="card" id="card-{id}">
            <div class="kpi-label">{icon} {kpi_label}</div>
            <div class="kpi-value">{kpi_value}</div>
            <div class="kpi-detail">{kpi_detail}</div>
            {gap}
            <p><strong>{lead}</strong> {body}</p>
            <div class="chart-box">
                <canvas id="chart-{id}" role="img" aria-label="{aria}"></canvas>
                <div class="chart-fallback">{svg}</div>
            </div>
            {details}
            <div class="period-note">{period}</div>
            <div class="card-sources">Sources: {links}</div>
        </article>
"#,
        id = escape(card.id()),
        icon = card.icon,
        kpi_label = escape(card.kpi_label),
        kpi_value = escape(card.kpi_value),
        kpi_detail = escape(card.kpi_detail),
        gap = gap,
        lead = escape(card.lead),
        body = escape(card.body),
        aria = escape(card.aria_label),
        svg = svg,
        details = details,
        period = escape(card.period_note),
        links = links.join(" · "),
    ))
}

fn search_text(record: &EvidenceRecord) -> String {
    SortKey::ALL
        .iter()
        .map(|k| k.field(record).to_lowercase())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_header_cell(key: SortKey, state: &TableState) -> String {
    if !state.sortable {
        return format!(r#"<th scope="col">{}</th>"#, escape(key.label()));
    }
    format!(
        r#"<th scope="col" data-sort="{key}" aria-sort="{aria}"><button type="button" aria-label="{label}, {hint}">{label}<span class="sort-ind" aria-hidden="true"></span></button></th>"#,
        key = key,
        aria = state.aria_sort(key),
        label = escape(key.label()),
        hint = state.next_sort_hint(key),
    )
}

fn render_row(row: &RowView<'_>, options: &TableOptions) -> String {
    let mut out = String::new();
    if let Some(header) = row.group_header {
        out.push_str(&format!(
            r#"<tr class="group-row" data-group="{}"><th colspan="4" scope="colgroup">{}</th></tr>"#,
            row.group,
            escape(header)
        ));
    }

    let mut classes = vec!["row"];
    if row.striped {
        classes.push("striped");
    }
    if row.highlighted {
        classes.push("highlight");
    }

    let mut pills = String::new();
    if let Some(period) = &row.parts.period {
        pills.push_str(&format!(r#"<span class="pill period">{}</span>"#, escape(period)));
    }
    if let Some(trend) = row.trend {
        pills.push_str(&format!(r#"<span class="pill {}">{}</span>"#, trend.tone().css_class(), trend.label()));
    }
    if let Some(gap) = &row.gap {
        pills.push_str(&format!(
            r#"<span class="pill {}">{} vs fringe</span>"#,
            gap.tone.css_class(),
            escape(&gap.text)
        ));
    }

    out.push_str(&format!(
        r#"<tr class="{classes}" data-index="{index}" data-group="{group}" data-search="{search}"><td><span aria-hidden="true">{icon}</span> {domain}</td><td{medway_class}>{medway}<div>{pills}</div></td><td>{comparators}</td><td>{why}</td></tr>"#,
        classes = classes.join(" "),
        index = row.index,
        group = row.group,
        search = escape(&search_text(row.record)),
        icon = row.icon,
        domain = escape(&row.record.domain),
        medway_class = if options.highlight_medway_column { r#" class="col-medway""# } else { "" },
        medway = render_fragments(&row.medway_fragments),
        pills = pills,
        comparators = render_fragments(&row.comparator_fragments),
        why = escape(&row.record.why),
    ));
    out
}

fn render_table(view: &TableView<'_>, state: &TableState, options: &TableOptions) -> String {
    let body = match view {
        TableView::Loading => {
            let skeleton: String = (0..3)
                .map(|_| r#"<tr class="skeleton"><td><span></span></td><td><span></span></td><td><span></span></td><td><span></span></td></tr>"#)
                .collect();
            format!(
                r#"<table aria-busy="true"><tbody>{}</tbody></table><p class="sr-only">Loading evidence…</p>"#,
                skeleton
            )
        }
        TableView::Error(msg) => {
            format!(r#"<p class="table-error" role="alert">Could not load evidence: {}</p>"#, escape(msg))
        }
        TableView::Empty => format!(r#"<p class="table-empty" id="table-empty">{}</p>"#, EMPTY_MESSAGE),
        TableView::Rows(rows) => {
            let head: String = SortKey::ALL.iter().map(|k| render_header_cell(*k, state)).collect();
            let body: String = rows.iter().map(|row| render_row(row, options)).collect();
            format!(
                r#"<table id="evidence-table" class="{compact}"><caption class="sr-only">{caption}</caption><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>
    <p class="table-empty" id="table-empty" hidden>{empty}</p>"#,
                compact = if options.compact { "compact" } else { "" },
                caption = escape(&options.title),
                head = head,
                body = body,
                empty = EMPTY_MESSAGE,
            )
        }
    };

    let toolbar = if matches!(view, TableView::Rows(_)) {
        format!(
            r#"<div class="toolbar">
        <label class="sr-only" for="table-search">Filter evidence</label>
        <input type="search" id="table-search" placeholder="Filter evidence…" autocomplete="off">
        <button type="button" id="csv-download">Download CSV ({})</button>
    </div>"#,
            CSV_FILENAME
        )
    } else {
        String::new()
    };

    format!(
        r#"    <section class="section" id="evidence" aria-labelledby="evidence-title">
    <h2 id="evidence-title">{title}</h2>
    <div class="meta">{meta}</div>
    {toolbar}
    {body}
    <p class="footer-note">{footer}</p>
    </section>"#,
        title = escape(&options.title),
        meta = escape(&options.freshness_note),
        toolbar = toolbar,
        body = body,
        footer = escape(options.footer_text()),
    )
}

fn render_source(source: &Source) -> String {
    let inner = format!(
        r#"<div class="tag">{}</div><div>{}</div><div class="host">{}</div><div class="ref">{}</div>"#,
        escape(&source.tag),
        escape(&source.label),
        escape(&source.host().unwrap_or_default()),
        source.reference_note()
    );
    let search = escape(&source.search_text());
    match &source.url {
        Some(url) => format!(
            r#"<a class="source-card" id="source-{}" href="{}" target="_blank" rel="noopener noreferrer" data-search="{}">{}</a>"#,
            escape(&source.key),
            escape(url),
            search,
            inner
        ),
        None => format!(
            r#"<div class="source-card" id="source-{}" data-search="{}">{}</div>"#,
            escape(&source.key),
            search,
            inner
        ),
    }
}

fn render_checklist(title: &str, items: &[&VerifyStep]) -> String {
    let body: String = items
        .iter()
        .map(|v| {
            let steps: String = v.steps.iter().map(|s| format!("<li>{}</li>", escape(s))).collect();
            format!(
                r#"<div class="check-item" data-domain="{}"><strong>{} {}</strong> <span class="check-count">{}</span><ol>{}</ol></div>"#,
                escape(&v.domain.to_lowercase()),
                v.category().icon(),
                escape(&v.domain),
                v.step_count_label(),
                steps
            )
        })
        .collect();
    format!("<div><h3>{}</h3>{}</div>", title, body)
}

fn render_sources(sources: &[Source], steps: &[VerifyStep]) -> String {
    let groups = group_sources(sources, "");
    let count = source_count(&groups);
    let groups_html: String = groups
        .iter()
        .map(|g| {
            let items: String = g.items.iter().map(render_source).collect();
            format!(
                r#"<div class="source-group" data-kind="{}"><h3><span aria-hidden="true">{}</span> {}</h3><div class="source-list">{}</div></div>"#,
                g.kind,
                g.icon,
                g.label,
                items
            )
        })
        .collect();

    let checklists = split_checklists(steps, "");
    let idle = CopyState::Idle;

    format!(
        r#"    <section class="section" id="sources" aria-labelledby="sources-title">
    <h2 id="sources-title">Sources &amp; methods</h2>
    <div class="toolbar">
        <label class="sr-only" for="source-search">Filter sources</label>
        <input type="search" id="source-search" placeholder="Filter sources…" autocomplete="off">
        <span class="meta" id="source-count">{count} {noun}</span>
    </div>
    {groups}
    <p class="table-empty" id="sources-empty" hidden>No sources match this filter.</p>
    <div class="checklists">
        {cost}
        {other}
    </div>
    <div class="toolbar">
        <button type="button" id="copy-checklist">{copy_label}</button>
        <span class="sr-only" id="copy-live" role="status" aria-live="polite"></span>
    </div>
    <label class="sr-only" for="manual-copy">Checklist text for manual copy</label>
    <textarea class="manual-copy" id="manual-copy" readonly hidden>{text}</textarea>
    </section>"#,
        count = count,
        noun = if count == 1 { "source" } else { "sources" },
        groups = groups_html,
        cost = render_checklist("Cost checks", &checklists.cost),
        other = render_checklist("Workforce &amp; other checks", &checklists.other),
        copy_label = idle.button_label(),
        text = escape(&checklist_text(steps)),
    )
}

/// Closing tags inside the JSON would end the script element early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn build_json_data(site: &Site, specs: &[ChartSpec]) -> Result<String> {
    let base = site.table_state();
    let mut order = serde_json::Map::new();
    for key in SortKey::ALL {
        for dir in [SortDir::Asc, SortDir::Desc] {
            let state = base.clone().sorted_by(key, dir);
            order.insert(format!("{}:{}", key, dir.as_str()), json!(sort_order(&site.records, &state)));
        }
    }

    let rows = site.records.iter().map(row_line).collect::<Result<Vec<_>>>()?;
    let labels: serde_json::Map<String, serde_json::Value> =
        SortKey::ALL.iter().map(|k| (k.as_str().to_string(), json!(k.label()))).collect();
    let mut copy_labels = serde_json::Map::new();
    let mut copy_messages = serde_json::Map::new();
    for (name, s) in [("idle", CopyState::Idle), ("copied", CopyState::Copied), ("failed", CopyState::Failed)] {
        copy_labels.insert(name.to_string(), json!(s.button_label()));
        copy_messages.insert(name.to_string(), json!(s.message()));
    }

    let groups: Vec<&str> = site.records.iter().map(|r| r.resolved_group().as_str()).collect();
    let header = header_line()?;

    let data = json!({
        "sortable": base.sortable,
        "order": order,
        "groups": groups,
        "labels": labels,
        "csv": {
            "filename": CSV_FILENAME,
            "header": header,
            "rows": rows
        },
        "charts": specs,
        "checklist": checklist_text(&site.verify_steps),
        "copy": {
            "statusMs": COPY_STATUS_MS,
            "liveMs": LIVE_MESSAGE_MS,
            "labels": copy_labels,
            "messages": copy_messages
        }
    });

    Ok(script_safe(&serde_json::to_string(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::evidence::data::evidence_rows;

    fn page(site: &Site) -> String {
        let mut out = Vec::new();
        write(&mut out, site).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn site() -> Site {
        Site::from_config(&Config::default()).unwrap()
    }

    // ==========================================================================
    // PAGE STRUCTURE
    // ==========================================================================

    #[test]
    fn test_page_contains_every_section() {
        let html = page(&site());
        assert!(html.contains(r#"id="evidence-table""#));
        assert!(html.contains(r#"id="sources""#));
        assert!(html.contains(r#"id="chart-housing""#));
        assert!(html.contains(r#"id="chart-council-tax""#));
        assert!(html.contains("6 datapoints · 4 cost · 2 workforce"));
        assert!(html.contains("No download configured"));
        assert_eq!(html.matches(r#"<tr class="row"#).count(), 6);
        assert_eq!(html.matches(r#"class="group-row""#).count(), 2);
    }

    #[test]
    fn test_sortable_headers_carry_aria_state() {
        let html = page(&site());
        assert!(html.contains(r#"data-sort="domain" aria-sort="ascending""#));
        assert!(html.contains(r#"data-sort="medway" aria-sort="none""#));
        assert!(html.contains("Domain, activate to sort descending"));
    }

    #[test]
    fn test_non_sortable_headers_are_plain() {
        let mut site = site();
        site.table.sortable = false;
        let html = page(&site);
        assert!(!html.contains("data-sort="));
        assert!(!html.contains("Highest pressure first"));
    }

    #[test]
    fn test_evidence_pack_link_when_configured() {
        let mut site = site();
        site.evidence_pack = EvidencePackAction::from_url(Some("https://example.org/pack.zip"));
        let html = page(&site);
        assert!(html.contains(r#"<a class="pack" href="https://example.org/pack.zip" download>"#));
    }

    // ==========================================================================
    // TABLE STATES
    // ==========================================================================

    #[test]
    fn test_error_state_suppresses_table() {
        let state = TableState::default();
        let html = render_table(&TableView::Error("feed down".into()), &state, &TableOptions::default());
        assert!(html.contains("Could not load evidence: feed down"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("csv-download"));
    }

    #[test]
    fn test_empty_and_loading_states() {
        let state = TableState::default();
        let empty = render_table(&TableView::Empty, &state, &TableOptions::default());
        assert!(empty.contains(EMPTY_MESSAGE));
        let loading = render_table(&TableView::Loading, &state, &TableOptions::default());
        assert!(loading.contains(r#"aria-busy="true""#));
    }

    #[test]
    fn test_rows_escape_markup() {
        let mut records = evidence_rows();
        records[0].why = "<script>alert(1)</script>".into();
        let input = TableInput { rows: Some(&records), ..Default::default() };
        let state = TableState::default();
        let html = render_table(&render_view(&input, &state, &TableOptions::default()), &state, &TableOptions::default());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // ==========================================================================
    // EMBEDDED DATA
    // ==========================================================================

    #[test]
    fn test_json_data_has_orders_for_every_key() {
        let site = site();
        let raw = build_json_data(&site, &site.chart_specs()).unwrap();
        let data: serde_json::Value = serde_json::from_str(&raw.replace("<\\/", "</")).unwrap();
        assert_eq!(data["order"].as_object().unwrap().len(), 8);
        assert_eq!(data["order"]["domain:asc"].as_array().unwrap().len(), 6);
        assert_eq!(data["csv"]["rows"].as_array().unwrap().len(), 6);
        assert_eq!(data["charts"].as_array().unwrap().len(), 5);
        assert_eq!(data["copy"]["labels"]["idle"], "Copy checklist");
        assert_eq!(data["copy"]["statusMs"], 2000);
    }

    #[test]
    fn test_script_safe_breaks_closing_tags() {
        assert_eq!(script_safe(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }

    #[test]
    fn test_chip_render_paths() {
        let link = Chip::Interactive {
            label: "Sources & methods".into(),
            tone: crate::table::chips::Tone::Steady,
            action: ChipAction::Link("#sources".into()),
        };
        assert_eq!(
            render_chip(&link),
            r##"<a class="chip tone-steady" href="#sources">Sources &amp; methods</a>"##
        );
        let sort = Chip::Interactive {
            label: "Highest pressure first".into(),
            tone: crate::table::chips::Tone::Up,
            action: ChipAction::Sort(SortKey::Domain),
        };
        assert!(render_chip(&sort).starts_with(r#"<button type="button" class="chip tone-up" data-sort-chip="domain">"#));
    }
}
