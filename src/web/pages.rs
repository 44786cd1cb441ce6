// src/web/pages.rs
//! Built-in demo form, for exercising the whole pipeline against a page we control.

pub const DEMO_FORM: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>Demo Application Form</title>
<style>body{font-family:Arial;margin:2rem}label{display:block;margin:.5rem 0}.box{border:1px solid #ccc;padding:1rem;border-radius:8px}</style>
</head><body>
  <h1>Demo Application Form</h1>
  <form class="box" method="post" action="/public/ok.html" enctype="multipart/form-data">
    <label>Full Name <input type="text" name="name" aria-label="Full Name"></label>
    <label>Email <input type="email" name="email" aria-label="Email"></label>
    <label>Phone <input type="tel" name="phone" aria-label="Phone"></label>
    <label>CV <input type="file" name="cv"></label>
    <button type="submit">Submit</button>
  </form>
  <p>Use this page to try the worker end to end before pointing it at a real site.</p>
</body></html>"#;

pub const SUBMITTED: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>Submitted</title></head>
<body><h1>Submitted ✔</h1></body></html>"#;
