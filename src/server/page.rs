//! page.rs
//! Minimal HTML console for the control plane, rendered from one snapshot.

use crate::protocol::StateSnapshot;

/// Build the console page. Form fields are pre-filled with the stored
/// (post-clamp) configuration so a reload always shows what the engine
/// actually uses.
pub fn build_page(s: &StateSnapshot) -> String {
    format!(
        concat!(
            "<!doctype html>",
            "<html><head><meta name='viewport' content='width=device-width,initial-scale=1'>",
            "<title>PID Loop Console</title>",
            "<style>",
            "body{{font-family:Verdana,Arial,sans-serif;background:#f5f2e9;margin:20px;}}",
            ".card{{background:#fff;border:2px solid #222;padding:16px;margin-bottom:16px;}}",
            "button{{padding:10px 14px;margin:4px;border:2px solid #222;background:#eae2d0;}}",
            "input{{padding:6px;border:2px solid #222;width:90px;}}",
            "</style></head><body>",
            "<h2>PID Loop Console</h2>",
            "<div class='card'>",
            "<div><b>State</b>: running={running} t={time:.2}s</div>",
            "<div><b>Loop</b>: setpoint={setpoint:.2} control={control:.3} ",
            "actuator={actuator:.3} output={output:.3}</div>",
            "</div>",
            "<div class='card'>",
            "<button onclick=\"location.href='/api/config?run=1'\">Run</button>",
            "<button onclick=\"location.href='/api/config?run=0'\">Stop</button>",
            "<button onclick=\"location.href='/api/config?reset=1'\">Reset</button>",
            "</div>",
            "<div class='card'>",
            "<form action='/api/config' method='get'>",
            "<label>setpoint <input name='setpoint' value='{setpoint_cfg}'/></label> ",
            "<label>kp <input name='kp' value='{kp}'/></label> ",
            "<label>ki <input name='ki' value='{ki}'/></label> ",
            "<label>kd <input name='kd' value='{kd}'/></label> ",
            "<label>dt <input name='dt' value='{dt}'/></label> ",
            "<label>model <input name='model' value='{model}'/></label> ",
            "<label>gain <input name='gain' value='{gain}'/></label> ",
            "<label>tau <input name='tau' value='{tau}'/></label> ",
            "<label>wn <input name='wn' value='{wn}'/></label> ",
            "<label>zeta <input name='zeta' value='{zeta}'/></label> ",
            "<label>dead <input name='dead' value='{dead}'/></label> ",
            "<label>act_min <input name='act_min' value='{act_min}'/></label> ",
            "<label>act_max <input name='act_max' value='{act_max}'/></label> ",
            "<button type='submit'>Apply</button>",
            "</form>",
            "</div>",
            "<div class='card'><a href='/api/state'>state.json</a></div>",
            "</body></html>",
        ),
        running = s.running,
        time = s.time,
        setpoint = s.setpoint,
        control = s.control,
        actuator = s.actuator,
        output = s.output,
        setpoint_cfg = s.setpoint_cfg,
        kp = s.kp,
        ki = s.ki,
        kd = s.kd,
        dt = s.dt,
        model = s.model,
        gain = s.gain,
        tau = s.tau,
        wn = s.wn,
        zeta = s.zeta,
        dead = s.dead,
        act_min = s.act_min,
        act_max = s.act_max,
    )
}
