// src/browser/scripts.rs
//! Page-side JavaScript. Each constant is a self-contained expression.

/// Tags every reported element with `data-apply-ref` and returns the
/// inventory as a JSON array of `FormControl`s, in document order.
pub const INVENTORY_SCRIPT: &str = r#"(() => {
  const REF = 'data-apply-ref';
  const SKIPPED = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'HEAD']);
  const TEXT_TYPES = new Set(['text', 'email', 'tel', 'url', 'search', 'number', 'password']);
  const BUTTON_TYPES = new Set(['submit', 'button', 'reset', 'image']);
  const collapse = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const orNull = (s) => (s && s.length ? s : null);

  document.querySelectorAll('[' + REF + ']').forEach((el) => el.removeAttribute(REF));

  const visible = (el) => {
    if (el.type === 'hidden') return false;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    return el.getClientRects().length > 0;
  };

  const labelOf = (el) => {
    const ids = el.getAttribute('aria-labelledby');
    if (ids) {
      const text = collapse(ids.split(/\s+/).map((id) => {
        const target = document.getElementById(id);
        return target ? target.textContent : '';
      }).join(' '));
      if (text) return text;
    }
    const aria = collapse(el.getAttribute('aria-label'));
    if (aria) return aria;
    if (el.labels && el.labels.length) {
      const text = collapse(Array.from(el.labels).map((l) => l.textContent).join(' '));
      if (text) return text;
    }
    if (el.id) {
      const text = collapse(Array.from(document.querySelectorAll('label[for="' + CSS.escape(el.id) + '"]'))
        .map((l) => l.textContent).join(' '));
      if (text) return text;
    }
    const wrapping = el.closest('label');
    return wrapping ? orNull(collapse(wrapping.textContent)) : null;
  };

  const ownText = (el) => {
    let text = '';
    el.childNodes.forEach((n) => { if (n.nodeType === Node.TEXT_NODE) text += ' ' + n.textContent; });
    return orNull(collapse(text).slice(0, 200));
  };

  const controls = [];
  for (const el of document.body ? document.body.querySelectorAll('*') : []) {
    if (SKIPPED.has(el.tagName) || el.closest('script,style,noscript,template')) continue;
    const tag = el.tagName.toLowerCase();
    const inputType = tag === 'input' ? (el.getAttribute('type') || 'text').toLowerCase() : null;
    const role = (el.getAttribute('role') || '').toLowerCase();
    const textEntry = tag === 'textarea'
      || (tag === 'input' && TEXT_TYPES.has(inputType))
      || (tag !== 'input' && (role === 'textbox' || el.isContentEditable));
    const fileInput = inputType === 'file';
    const button = tag === 'button' || role === 'button' || (inputType !== null && BUTTON_TYPES.has(inputType));
    const interactive = textEntry || fileInput || button || tag === 'select' || tag === 'input';
    const text = ownText(el);
    if (!interactive && text === null) continue;

    const label = interactive ? labelOf(el) : null;
    let name = label;
    if (button && !name) {
      name = orNull(collapse(el.textContent))
        || orNull(collapse(el.getAttribute('value')))
        || orNull(collapse(el.getAttribute('title')))
        || (inputType === 'submit' ? 'Submit' : null);
    }

    const ref = controls.length;
    el.setAttribute(REF, String(ref));
    controls.push({
      ref,
      tag,
      inputType,
      label,
      name,
      text,
      visible: visible(el),
      disabled: !!el.disabled || el.getAttribute('aria-disabled') === 'true',
      textEntry,
      fileInput,
      button,
    });
  }
  return controls;
})()"#;

/// Function taking `(selector, value)`. Sets the value through the native
/// setter so framework-managed inputs see the change.
pub const FILL_FUNCTION: &str = r#"(selector, value) => {
  const el = document.querySelector(selector);
  if (!el) return { ok: false, reason: 'element detached' };
  if (el.disabled || el.readOnly) return { ok: false, reason: 'element is not editable' };
  el.scrollIntoView({ block: 'center' });
  el.focus();
  if (el.isContentEditable) {
    el.textContent = value;
  } else {
    const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
    const setter = Object.getOwnPropertyDescriptor(proto, 'value');
    if (setter && setter.set) { setter.set.call(el, value); } else { el.value = value; }
  }
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
  el.blur();
  return { ok: true, reason: null };
}"#;

/// Marks the current document so a finished navigation can be told apart
/// from the page it replaced.
pub const MARK_STALE_SCRIPT: &str = "window.__applyStale = true; true";

pub const DOCUMENT_READY_SCRIPT: &str =
    "(() => !window.__applyStale && document.readyState !== 'loading')()";

/// Function taking a bound in milliseconds. Resolves `true` once the load event
/// has fired, every image has finished, web fonts are ready and two frames have
/// been painted, or `false` when the bound runs out first.
pub const RENDER_SETTLE_FUNCTION: &str = r#"async (timeoutMs) => {
  const deadline = new Promise((r) => setTimeout(() => r(false), timeoutMs));
  const settled = (async () => {
    if (document.readyState !== 'complete') {
      await new Promise((r) => window.addEventListener('load', r, { once: true }));
    }
    const pending = Array.from(document.images).filter((img) => !img.complete);
    await Promise.all(pending.map((img) => new Promise((r) => {
      img.addEventListener('load', r, { once: true });
      img.addEventListener('error', r, { once: true });
    })));
    if (document.fonts && document.fonts.ready) { await document.fonts.ready; }
    await new Promise((r) => requestAnimationFrame(() => requestAnimationFrame(r)));
    return true;
  })();
  return Promise.race([settled, deadline]);
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_ignores_the_marked_document() {
        assert!(MARK_STALE_SCRIPT.contains("window.__applyStale = true"));
        assert!(DOCUMENT_READY_SCRIPT.contains("!window.__applyStale"));
    }

    #[test]
    fn test_settle_function_is_bounded() {
        assert!(RENDER_SETTLE_FUNCTION.starts_with("async (timeoutMs) =>"));
        assert!(RENDER_SETTLE_FUNCTION.contains("setTimeout(() => r(false), timeoutMs)"));
        assert!(RENDER_SETTLE_FUNCTION.contains("Promise.race([settled, deadline])"));
    }
}
