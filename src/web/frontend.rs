//! Embedded HTML/CSS/JS pages served by `resolvx web`.
//!
//! Both pages are compiled into the binary as string constants. The only
//! external asset is Chart.js on the dashboard page, which draws the chart
//! configurations produced by the renderer.

/// Landing page: metrics bar and complaint form.
pub const LANDING_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>ResolvX - CarePilot</title>
<style>
:root {
  --bg: #f4f6fb;
  --surface: #ffffff;
  --border: #dde1e6;
  --text: #161616;
  --text-muted: #6f6f6f;
  --accent: #0f62fe;
  --amber: #f59e0b;
  --green: #10b981;
  --red: #da1e28;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 15px; line-height: 1.5; }
.app { max-width: 960px; margin: 0 auto; padding: 32px 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 28px; }
header h1 { font-size: 26px; font-weight: 700; }
header h1 span { color: var(--accent); }
header a { color: var(--accent); text-decoration: none; font-weight: 600; }

.metrics-bar { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-bottom: 32px; }
.metric { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 18px; text-align: center; }
.metric .value { font-size: 30px; font-weight: 700; color: var(--accent); }
.metric.high .value { color: var(--amber); }
.metric.resolved .value { color: var(--green); }
.metric .label { color: var(--text-muted); font-size: 13px; }

.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 28px; }
.card h2 { font-size: 20px; margin-bottom: 6px; }
.card p.lead { color: var(--text-muted); margin-bottom: 20px; }
.field { margin-bottom: 16px; }
.field label { display: block; font-weight: 600; margin-bottom: 6px; }
.field label .req { color: var(--red); }
.field input, .field textarea { width: 100%; padding: 10px 12px; border: 1px solid var(--border); border-radius: 6px; font: inherit; }
.field textarea { min-height: 140px; resize: vertical; }
button { background: var(--accent); color: #fff; border: none; border-radius: 6px; padding: 12px 22px; font: inherit; font-weight: 600; cursor: pointer; }
button:disabled { opacity: 0.6; cursor: wait; }

.message { display: none; margin-top: 16px; padding: 12px 14px; border-radius: 6px; }
.message.show { display: block; }
.message.success { background: #defbe6; color: #0e6027; }
.message.error { background: #fff1f1; color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>Resolv<span>X</span></h1>
    <a href="/dashboard">Open dashboard &rarr;</a>
  </header>

  <section class="metrics-bar">
    <div class="metric"><div class="value" id="metric-total">-</div><div class="label">Total Tickets</div></div>
    <div class="metric high"><div class="value" id="metric-high">-</div><div class="label">High Priority</div></div>
    <div class="metric resolved"><div class="value" id="metric-resolved">-</div><div class="label">Resolved</div></div>
  </section>

  <section class="card" id="complaint">
    <h2>Raise a complaint</h2>
    <p class="lead">Tell us what went wrong. We will open a pre-filled email for you to review and send.</p>
    <form id="complaintForm" novalidate>
      <div class="field"><label for="personalEmail">Your email <span class="req">*</span></label><input id="personalEmail" type="email"></div>
      <div class="field"><label for="customerName">Your name <span class="req">*</span></label><input id="customerName" type="text"></div>
      <div class="field"><label for="companyName">Company <span class="req">*</span></label><input id="companyName" type="text"></div>
      <div class="field"><label for="phoneNumber">Phone</label><input id="phoneNumber" type="tel"></div>
      <div class="field"><label for="problemDescription">Problem description <span class="req">*</span></label><textarea id="problemDescription"></textarea></div>
      <button type="submit" id="submitBtn">Send complaint</button>
      <div class="message" id="message"></div>
    </form>
  </section>
</div>

<script>
// ---------------------------------------------------------------------------
// Metrics bar
// ---------------------------------------------------------------------------
function counter(v) {
  return v === undefined || v === null ? '-' : v.toLocaleString();
}

async function loadDashboardMetrics() {
  try {
    const res = await fetch('/api/metrics');
    const m = await res.json();
    document.getElementById('metric-total').textContent = counter(m.counters.total_tickets);
    document.getElementById('metric-high').textContent = counter(m.counters.high_priority);
    document.getElementById('metric-resolved').textContent = counter(m.counters.resolved);
    return m.refresh_interval_secs;
  } catch (e) {
    ['metric-total', 'metric-high', 'metric-resolved'].forEach(id => document.getElementById(id).textContent = '-');
    return null;
  }
}

(async () => {
  const interval = (await loadDashboardMetrics()) || 30;
  setInterval(loadDashboardMetrics, interval * 1000);
})();

// ---------------------------------------------------------------------------
// Complaint form
// ---------------------------------------------------------------------------
function showMessage(text, type) {
  const el = document.getElementById('message');
  el.textContent = text;
  el.className = `message ${type} show`;
  if (type === 'success') setTimeout(() => el.classList.remove('show'), 10000);
}

document.getElementById('complaintForm').addEventListener('submit', async e => {
  e.preventDefault();
  const form = e.target;
  const btn = document.getElementById('submitBtn');
  const value = id => document.getElementById(id).value;

  btn.disabled = true;
  try {
    const res = await fetch('/api/complaint', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        personalEmail: value('personalEmail'),
        customerName: value('customerName'),
        companyName: value('companyName'),
        phoneNumber: value('phoneNumber'),
        problemDescription: value('problemDescription'),
      }),
    });
    const data = await res.json();
    if (!res.ok) {
      showMessage(data.error, 'error');
      return;
    }

    const win = window.open(data.mail.gmail_url, '_blank');
    if (!win || win.closed || typeof win.closed === 'undefined') {
      window.location.href = data.mail.mailto_url;
    }
    showMessage(data.message, 'success');
    setTimeout(() => form.reset(), 1000);
  } catch (err) {
    showMessage('There was an error opening Gmail. Please try again or contact support directly.', 'error');
  } finally {
    btn.disabled = false;
  }
});
</script>
</body>
</html>"##;

/// Dashboard page: summary cards, filters, ticket list, charts and the
/// ticket detail modal.
pub const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>ResolvX Dashboard</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
<style>
:root {
  --bg: #f4f6fb;
  --surface: #ffffff;
  --border: #dde1e6;
  --text: #161616;
  --text-muted: #6f6f6f;
  --accent: #0f62fe;
  --high: #f59e0b;
  --medium: #3b82f6;
  --low: #10b981;
  --red: #da1e28;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1280px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px; }
header h1 { font-size: 24px; }
header a { color: var(--accent); text-decoration: none; margin-right: 16px; }
button { background: var(--accent); color: #fff; border: none; border-radius: 6px; padding: 8px 14px; font: inherit; cursor: pointer; }
button.secondary { background: #e0e0e0; color: var(--text); }

.state { padding: 48px; text-align: center; color: var(--text-muted); }
.state.error { color: var(--red); }
#content { display: none; }

.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; margin-bottom: 24px; }
.stat { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; }
.stat .value { font-size: 28px; font-weight: 700; }
.stat .label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }

.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin-bottom: 24px; }
.panel { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; }
.panel h2 { font-size: 16px; margin-bottom: 12px; }
.panel .empty { color: var(--text-muted); padding: 24px; text-align: center; }
.chart-box { position: relative; height: 280px; }

.filters { display: flex; gap: 12px; margin-bottom: 12px; }
select { padding: 6px 10px; border: 1px solid var(--border); border-radius: 6px; font: inherit; }

.ticket { border: 1px solid var(--border); border-left: 4px solid var(--medium); border-radius: 6px; padding: 10px 12px; margin-bottom: 8px; cursor: pointer; }
.ticket.HIGH { border-left-color: var(--high); }
.ticket.LOW { border-left-color: var(--low); }
.ticket .meta { color: var(--text-muted); font-size: 12px; }
.pill { display: inline-block; padding: 1px 8px; border-radius: 10px; font-size: 11px; font-weight: 600; background: #eef2ff; }

.customer { display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid var(--border); }
.customer .count { font-weight: 700; color: var(--high); }

.modal { display: none; position: fixed; inset: 0; background: rgba(0,0,0,0.4); align-items: center; justify-content: center; }
.modal.show { display: flex; }
.modal .dialog { background: var(--surface); border-radius: var(--radius); padding: 24px; width: 560px; max-width: 92vw; }
.modal dl { display: grid; grid-template-columns: 140px 1fr; gap: 6px 12px; margin: 16px 0; }
.modal dt { color: var(--text-muted); }
.modal .actions { display: flex; gap: 8px; justify-content: flex-end; }
.notice { margin-top: 12px; color: var(--red); font-size: 13px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>Support Dashboard</h1>
    <div><a href="/">Home</a><button id="refresh">Refresh</button></div>
  </header>

  <div class="state" id="loading">Loading dashboard...</div>
  <div class="state error" id="error" style="display:none"></div>

  <div id="content">
    <section class="cards">
      <div class="stat"><div class="value" id="stat-total">0</div><div class="label">Total Tickets</div></div>
      <div class="stat"><div class="value" id="stat-high">0</div><div class="label">High Priority</div></div>
      <div class="stat"><div class="value" id="stat-resolved">0</div><div class="label">Resolved</div></div>
      <div class="stat"><div class="value" id="stat-companies">0</div><div class="label">Companies</div></div>
    </section>

    <section class="grid">
      <div class="panel"><h2>Tickets by Company</h2><div class="chart-box" id="company-box"><canvas id="chart-company"></canvas></div></div>
      <div class="panel"><h2>Priority Distribution</h2><div class="chart-box"><canvas id="chart-priority"></canvas></div></div>
    </section>

    <section class="grid">
      <div class="panel">
        <h2>Tickets</h2>
        <div class="filters">
          <select id="filter-priority">
            <option value="all">All priorities</option>
            <option value="HIGH">High</option>
            <option value="MEDIUM">Medium</option>
            <option value="LOW">Low</option>
          </select>
          <select id="filter-company"><option value="all">All companies</option></select>
        </div>
        <div id="ticket-list"></div>
      </div>
      <div class="panel"><h2>High Priority Customers</h2><div id="top-customers"></div></div>
    </section>

    <section class="panel">
      <h2>Product Analysis</h2>
      <div class="filters"><select id="product-company"><option value="">Select a company</option></select></div>
      <div class="chart-box" id="product-box"><canvas id="chart-product"></canvas></div>
    </section>
  </div>
</div>

<div class="modal" id="modal">
  <div class="dialog">
    <h2 id="modal-title"></h2>
    <dl id="modal-fields"></dl>
    <div class="actions">
      <button data-status="IN_PROGRESS">Mark In Progress</button>
      <button data-status="RESOLVED">Mark Resolved</button>
      <button class="secondary" id="modal-close">Close</button>
    </div>
    <div class="notice" id="modal-notice"></div>
  </div>
</div>

<script>
// ---------------------------------------------------------------------------
// Charts: one live instance per slot, destroyed before re-creation
// ---------------------------------------------------------------------------
const charts = {};

function drawChart(slot, canvasId, chart) {
  if (charts[slot]) {
    if (charts[slot].id === chart.handle.id) return;
    charts[slot].instance.destroy();
    delete charts[slot];
  }
  const cfg = chart.config;
  const options = { responsive: true, maintainAspectRatio: false };
  if (cfg.title) options.plugins = { title: { display: true, text: cfg.title } };
  const instance = new Chart(document.getElementById(canvasId), {
    type: cfg.kind,
    data: { labels: cfg.labels, datasets: cfg.datasets },
    options,
  });
  charts[slot] = { id: chart.handle.id, instance };
}

function clearChart(slot) {
  if (charts[slot]) {
    charts[slot].instance.destroy();
    delete charts[slot];
  }
}

function panel(boxId, canvasId, slot, p, draw) {
  const box = document.getElementById(boxId);
  box.querySelectorAll('.empty').forEach(n => n.remove());
  const canvas = document.getElementById(canvasId);
  if (p.state === 'ready') {
    canvas.style.display = '';
    draw(p.data);
  } else {
    clearChart(slot);
    canvas.style.display = 'none';
    box.insertAdjacentHTML('beforeend', `<div class="empty">${esc(p.data.message)}</div>`);
  }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------
async function loadDashboard(query) {
  show('loading');
  try {
    const res = await fetch('/api/dashboard' + (query || ''));
    const data = await res.json();
    render(data);
  } catch (e) {
    showError('Error loading dashboard: ' + e.message);
  }
}

function render(data) {
  if (data.view_state.state === 'error') {
    showError(data.view_state.message);
    return;
  }
  if (!data.view) {
    show('loading');
    return;
  }
  show('content');
  const v = data.view;

  setText('stat-total', v.summary.total_tickets);
  setText('stat-high', v.summary.high_priority);
  setText('stat-resolved', v.summary.resolved);
  setText('stat-companies', v.summary.companies);

  fillSelect('filter-company', v.filters.companies, 'all', 'All companies', v.filters.company);
  fillSelect('product-company', v.filters.companies, '', 'Select a company', v.filters.product_company || '');
  document.getElementById('filter-priority').value = v.filters.priority;

  renderTickets(v.tickets);
  renderCustomers(v.top_customers);
  panel('company-box', 'chart-company', 'company', v.company_chart, c => drawChart('company', 'chart-company', c));
  drawChart('priority', 'chart-priority', v.priority_chart);
  panel('product-box', 'chart-product', 'product', v.products, p => drawChart('product', 'chart-product', p.chart));
}

function renderTickets(p) {
  const list = document.getElementById('ticket-list');
  if (p.state !== 'ready') {
    list.innerHTML = `<div class="empty">${esc(p.data.message)}</div>`;
    return;
  }
  list.innerHTML = p.data.map(t => `
    <div class="ticket ${esc(t.priority)}" data-ref="${esc(t.reference)}">
      <div><strong>${esc(t.reference)}</strong> <span class="pill">${esc(t.priority)}</span> <span class="pill">${esc(t.status)}</span></div>
      <div>${esc(t.issue_description)}</div>
      <div class="meta">${esc(t.customer_name)} &middot; ${esc(t.company)} &middot; ${esc(t.created_at)}</div>
    </div>`).join('');
}

function renderCustomers(p) {
  const el = document.getElementById('top-customers');
  if (p.state !== 'ready') {
    el.innerHTML = `<div class="empty">${esc(p.data.message)}</div>`;
    return;
  }
  el.innerHTML = p.data.map(c => `
    <div class="customer">
      <div><strong>${esc(c.name)}</strong><div class="meta">${esc(c.email)}${c.companies.length ? ' &middot; ' + esc(c.companies.join(', ')) : ''}</div></div>
      <div class="count">${c.count}</div>
    </div>`).join('');
}

// ---------------------------------------------------------------------------
// Ticket detail
// ---------------------------------------------------------------------------
let openRef = null;

async function openTicket(ref) {
  const res = await fetch('/api/tickets/' + encodeURIComponent(ref));
  if (!res.ok) return;
  const t = await res.json();
  openRef = t.reference;
  setText('modal-title', 'Ticket ' + t.reference);
  const rows = [
    ['Customer', t.customer_name], ['Email', t.customer_email], ['Phone', t.customer_phone],
    ['Company', t.company], ['Priority', t.priority], ['Status', t.status],
    ['Created', t.created_at], ['Description', t.issue_description],
  ];
  document.getElementById('modal-fields').innerHTML = rows.map(([k, val]) => `<dt>${k}</dt><dd>${esc(val)}</dd>`).join('');
  setText('modal-notice', '');
  document.getElementById('modal').classList.add('show');
}

async function updateStatus(status) {
  const res = await fetch('/api/tickets/' + encodeURIComponent(openRef) + '/status', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ status }),
  });
  const data = await res.json();
  setText('modal-notice', data.error || data.message || '');
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------
document.getElementById('refresh').addEventListener('click', () => loadDashboard('?refresh=1'));
document.getElementById('filter-priority').addEventListener('change', applyFilters);
document.getElementById('filter-company').addEventListener('change', applyFilters);
document.getElementById('product-company').addEventListener('change', e =>
  loadDashboard('?product_company=' + encodeURIComponent(e.target.value)));
document.getElementById('ticket-list').addEventListener('click', e => {
  const card = e.target.closest('.ticket');
  if (card) openTicket(card.dataset.ref);
});
document.querySelectorAll('#modal [data-status]').forEach(b =>
  b.addEventListener('click', () => updateStatus(b.dataset.status)));
document.getElementById('modal-close').addEventListener('click', () =>
  document.getElementById('modal').classList.remove('show'));

function applyFilters() {
  const p = document.getElementById('filter-priority').value;
  const c = document.getElementById('filter-company').value;
  loadDashboard('?priority=' + encodeURIComponent(p) + '&company=' + encodeURIComponent(c));
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function show(which) {
  document.getElementById('loading').style.display = which === 'loading' ? 'block' : 'none';
  document.getElementById('error').style.display = which === 'error' ? 'block' : 'none';
  document.getElementById('content').style.display = which === 'content' ? 'block' : 'none';
}

function showError(msg) {
  setText('error', msg);
  show('error');
}

function setText(id, val) {
  document.getElementById(id).textContent = val;
}

function fillSelect(id, options, allValue, allLabel, selected) {
  const el = document.getElementById(id);
  el.innerHTML = `<option value="${allValue}">${allLabel}</option>` +
    options.map(o => `<option value="${esc(o)}">${esc(o)}</option>`).join('');
  el.value = selected;
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;').replace(/'/g,'&#39;');
}

loadDashboard();
</script>
</body>
</html>"##;
