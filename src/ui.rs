use crate::models::Person;

pub fn render_index(date: &str) -> String {
    let first = Person::ALL[0];
    let tabs: String = Person::ALL
        .iter()
        .enumerate()
        .map(|(index, person)| {
            format!(
                r#"<button class="tab{active}" type="button" data-person="{id}" data-color="{color}" role="tab" aria-selected="{selected}">{icon} {label}</button>"#,
                active = if index == 0 { " active" } else { "" },
                selected = index == 0,
                id = person.id(),
                color = person.color(),
                icon = person.icon(),
                label = person.label(),
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{TABS}}", &tabs)
        .replace("{{PERSON}}", first.id())
        .replace("{{LABEL}}", first.label())
        .replace("{{COLOR}}", first.color())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Weight Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #cfe0f5;
      --ink: #22262b;
      --accent: {{COLOR}};
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4f0fa 60%, #f9f7f2 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.5rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      box-shadow: none;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    form.row,
    .row {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 12px;
    }

    input,
    select {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      background: white;
    }

    input[type="text"] {
      width: 120px;
    }

    button.primary,
    button.secondary {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    button.primary {
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: rgba(47, 72, 88, 0.1);
      color: var(--accent-2);
    }

    button:active {
      transform: scale(0.98);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    #chart text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-average {
      fill: none;
      stroke: var(--accent);
      stroke-opacity: 0.7;
      stroke-width: 2;
      stroke-dasharray: 5 5;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .axis-controls {
      margin-top: 12px;
    }

    .axis-controls input {
      width: 80px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
      margin-top: 12px;
    }

    .stat {
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.4rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .history {
      list-style: none;
      margin: 0;
      padding: 0;
      max-height: 260px;
      overflow-y: auto;
    }

    .history li {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
      padding: 8px 4px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
      cursor: pointer;
    }

    .history .weight {
      color: #6f6a65;
      margin-left: auto;
    }

    .history button {
      border: none;
      background: transparent;
      color: #c63b2b;
      cursor: pointer;
      font-size: 0.9rem;
    }

    .empty {
      color: #8b857d;
      text-align: center;
      padding: 24px 0;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Weight Tracker</h1>
        <p id="title" class="subtitle">{{LABEL}}</p>
      </div>
      <div class="tabs" role="tablist">{{TABS}}</div>
    </header>

    <section class="card">
      <h2>Add entry</h2>
      <form id="entry-form" class="row" method="post" action="/people/{{PERSON}}/entries">
        <input id="entry-date" name="date" type="date" value="{{DATE}}" />
        <input id="entry-weight" name="weight" type="text" inputmode="decimal" placeholder="Weight (kg)" />
        <button class="primary" type="submit">Save</button>
      </form>
    </section>

    <section class="card">
      <h2>Weight curve</h2>
      <svg id="chart" viewBox="0 0 600 260" aria-label="Weight chart" role="img"></svg>
      <div class="row axis-controls">
        <label>Y min <input id="axis-min" type="text" inputmode="decimal" /></label>
        <label>Y max <input id="axis-max" type="text" inputmode="decimal" /></label>
        <button class="secondary" id="axis-apply" type="button">Apply</button>
        <button class="secondary" id="axis-reset" type="button">Reset</button>
      </div>
    </section>

    <section class="card">
      <h2>Statistics</h2>
      <div class="row">
        <label>Average over <select id="window"></select></label>
        <label><input id="reminder" type="checkbox" /> Daily reminder (<span id="reminder-time">--:--</span>)</label>
      </div>
      <div class="stats">
        <div class="stat"><span class="label">Latest</span><span class="value" id="stat-latest">&mdash;</span></div>
        <div class="stat"><span class="label" id="stat-average-label">7-day average</span><span class="value" id="stat-average">&mdash;</span></div>
        <div class="stat"><span class="label">Highest</span><span class="value" id="stat-max">&mdash;</span></div>
        <div class="stat"><span class="label">Lowest</span><span class="value" id="stat-min">&mdash;</span></div>
      </div>
    </section>

    <section class="card">
      <h2>History</h2>
      <ul class="history" id="history"></ul>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const titleEl = document.getElementById('title');
    const formEl = document.getElementById('entry-form');
    const dateEl = document.getElementById('entry-date');
    const weightEl = document.getElementById('entry-weight');
    const chartEl = document.getElementById('chart');
    const axisMinEl = document.getElementById('axis-min');
    const axisMaxEl = document.getElementById('axis-max');
    const windowEl = document.getElementById('window');
    const reminderEl = document.getElementById('reminder');
    const reminderTimeEl = document.getElementById('reminder-time');
    const historyEl = document.getElementById('history');
    const statusEl = document.getElementById('status');

    let activePerson = '{{PERSON}}';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const formatKg = (value, decimals = 2) => {
      if (typeof value !== 'number' || Number.isNaN(value)) {
        return '—';
      }
      return `${value.toFixed(decimals)} kg`;
    };

    const request = async (method, url, body) => {
      const options = { method, headers: {} };
      if (body !== undefined) {
        options.headers['content-type'] = 'application/json';
        options.body = JSON.stringify(body);
      }
      const res = await fetch(url, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const personUrl = (suffix) => `/api/people/${activePerson}${suffix}`;

    const renderChart = (data) => {
      const points = data.series;
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const paddingX = 44;
      const paddingY = 34;
      const top = 16;
      const min = data.axis.min;
      const max = data.axis.max;
      const dayMs = 24 * 60 * 60 * 1000;
      const days = points.map((point) => Date.parse(point.date) / dayMs);
      const first = days[0];
      const spanDays = Math.max(days[days.length - 1] - first, 1);

      const x = (index) => paddingX + ((days[index] - first) / spanDays) * (width - paddingX * 2);
      const y = (value) => height - paddingY - ((value - min) / (max - min)) * (height - top - paddingY);
      const path = (series) => series
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.weight).toFixed(2)}`)
        .join(' ');

      let grid = '';
      const stride = data.axis.stride;
      for (let value = Math.ceil(min / stride) * stride; value <= max + 1e-9; value += stride) {
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${value}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(points.length / 6));
      const xLabels = points
        .map((point, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.date.slice(5)}</text>`;
        })
        .join('');

      const circles = points
        .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.weight)}" r="4" />`)
        .join('');

      chartEl.innerHTML = `
        <defs><clipPath id="plot"><rect x="${paddingX}" y="${top}" width="${width - paddingX * 2}" height="${height - top - paddingY}" /></clipPath></defs>
        ${grid}
        <g clip-path="url(#plot)">
          <path class="chart-line" d="${path(points)}" />
          <path class="chart-average" d="${path(data.moving_average)}" />
          ${circles}
        </g>
        ${xLabels}
      `;
    };

    const renderStats = (data) => {
      windowEl.innerHTML = data.windows
        .map((days) => `<option value="${days}"${days === data.window ? ' selected' : ''}>${days} days</option>`)
        .join('');
      document.getElementById('stat-latest').textContent = formatKg(data.latest);
      document.getElementById('stat-average-label').textContent = `${data.window}-day average`;
      document.getElementById('stat-average').textContent = formatKg(data.average, 3);
      document.getElementById('stat-max').textContent = formatKg(data.max);
      document.getElementById('stat-min').textContent = formatKg(data.min);
    };

    const renderHistory = (data) => {
      if (!data.series.length) {
        historyEl.innerHTML = '<li class="empty">No entries yet</li>';
        return;
      }
      historyEl.innerHTML = data.series
        .map((point) => `
          <li data-date="${point.date}" data-weight="${point.weight.toFixed(2)}">
            <span>${point.date}</span>
            <span class="weight">${formatKg(point.weight)}</span>
            <button type="button" data-delete="${point.date}">Delete</button>
          </li>`)
        .join('');
    };

    const render = (data) => {
      document.documentElement.style.setProperty('--accent', data.color);
      titleEl.textContent = data.label;
      axisMinEl.value = data.axis.min;
      axisMaxEl.value = data.axis.max;
      renderChart(data);
      renderStats(data);
      renderHistory(data);
    };

    const loadSummary = async () => render(await request('GET', personUrl('/summary')));

    const loadReminder = async () => {
      const data = await request('GET', '/api/reminder');
      reminderEl.checked = data.enabled;
      reminderTimeEl.textContent = `${String(data.hour).padStart(2, '0')}:${String(data.minute).padStart(2, '0')}`;
    };

    const setActivePerson = (person) => {
      activePerson = person;
      formEl.action = `/people/${person}/entries`;
      tabs.forEach((button) => {
        const isActive = button.dataset.person === person;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      loadSummary().catch((err) => setStatus(err.message, 'error'));
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActivePerson(button.dataset.person));
    });

    formEl.addEventListener('submit', (event) => {
      event.preventDefault();
      request('POST', personUrl('/entries'), { date: dateEl.value, weight: weightEl.value })
        .then((data) => {
          render(data);
          weightEl.value = '';
          weightEl.blur();
          setStatus('', '');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('axis-apply').addEventListener('click', () => {
      request('POST', personUrl('/axis'), { min: axisMinEl.value, max: axisMaxEl.value })
        .then(render)
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('axis-reset').addEventListener('click', () => {
      request('POST', personUrl('/axis/reset'))
        .then(render)
        .catch((err) => setStatus(err.message, 'error'));
    });

    windowEl.addEventListener('change', () => {
      request('PUT', personUrl('/window'), { days: Number(windowEl.value) })
        .then(render)
        .catch((err) => setStatus(err.message, 'error'));
    });

    reminderEl.addEventListener('change', () => {
      request('POST', '/api/reminder', { enabled: reminderEl.checked })
        .then((data) => {
          reminderEl.checked = data.enabled;
          if (!data.enabled && !data.permission_granted) {
            setStatus('Notifications are not permitted', 'error');
          }
        })
        .catch((err) => {
          reminderEl.checked = false;
          setStatus(err.message, 'error');
        });
    });

    historyEl.addEventListener('click', (event) => {
      const target = event.target;
      if (target.dataset && target.dataset.delete) {
        event.stopPropagation();
        request('DELETE', personUrl(`/entries/${target.dataset.delete}`))
          .then(render)
          .catch((err) => setStatus(err.message, 'error'));
        return;
      }
      const row = target.closest('li[data-date]');
      if (row) {
        dateEl.value = row.dataset.date;
        weightEl.value = row.dataset.weight;
      }
    });

    Promise.all([loadSummary(), loadReminder()]).catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
